//! Themes; at most one is active at a time

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, Schema, Store, TxHandle, Values,
};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeColumn {
    #[column(primary_key)]
    Id,
    Name,
    Slug,
    #[column(default = "'1.0.0'")]
    Version,
    #[column(kind = "boolean", default = "0")]
    IsActive,
    /// Theme options as a JSON object
    #[column(kind = "json", default = "'{}'")]
    Settings,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThemeRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub version: String,
    pub is_active: bool,
    pub settings: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ThemeRecord {
    /// Parsed settings; malformed JSON reads as an empty object
    pub fn settings_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.settings)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}

pub struct Themes;

impl Schema for Themes {
    const TABLE_NAME: &'static str = "themes";
    type Column = ThemeColumn;
    type Record = ThemeRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreateTheme {
    pub name: String,
    pub slug: String,
    pub version: Option<String>,
    pub settings: Option<serde_json::Value>,
}

impl From<CreateTheme> for Values<ThemeColumn> {
    fn from(theme: CreateTheme) -> Self {
        Values::new()
            .set(ThemeColumn::Name, theme.name)
            .set(ThemeColumn::Slug, theme.slug)
            .set_opt(ThemeColumn::Version, theme.version)
            .set_opt(ThemeColumn::Settings, theme.settings)
    }
}

impl<H: Store> Model<Themes, H> {
    pub async fn find_active_theme(&self) -> ModelResult<Option<ThemeRecord>> {
        self.find_first(&[Filter::eq(ThemeColumn::IsActive, true)])
            .await
    }

    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<ThemeRecord>> {
        self.find_first(&[Filter::eq(ThemeColumn::Slug, slug)]).await
    }

    pub async fn update_settings(
        &self,
        id: &str,
        settings: serde_json::Value,
    ) -> ModelResult<ThemeRecord> {
        self.update(id, Values::new().set(ThemeColumn::Settings, settings))
            .await
    }
}

impl Model<Themes, Database> {
    /// Make `id` the only active theme.
    ///
    /// Runs in one transaction: an unknown id fails with [`ModelError::NotFound`](crate::orm::ModelError::NotFound)
    /// and leaves the previously active theme in place.
    pub async fn activate(&self, id: &str) -> ModelResult<ThemeRecord> {
        let id = id.to_string();
        let theme = self
            .store()
            .with_transaction(move |tx| async move {
                let themes: Model<Themes, TxHandle> = Model::new(tx);
                let active = themes
                    .find_many_where(
                        &[
                            Filter::eq(ThemeColumn::IsActive, true),
                            Filter::ne(ThemeColumn::Id, id.as_str()),
                        ],
                        FindOptions::default().limit(u64::MAX),
                    )
                    .await?;
                for theme in active {
                    themes
                        .update(&theme.id, Values::new().set(ThemeColumn::IsActive, false))
                        .await?;
                }
                themes
                    .update(&id, Values::new().set(ThemeColumn::IsActive, true))
                    .await
            })
            .await?;

        info!(theme = %theme.slug, "Theme activated");
        Ok(theme)
    }
}
