//! Installed plugins and their activation state

use serde::{Deserialize, Serialize};

use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, Store, Values,
};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginColumn {
    #[column(primary_key)]
    Id,
    Slug,
    Name,
    #[column(default = "'1.0.0'")]
    Version,
    #[column(kind = "boolean", default = "0")]
    IsActive,
    #[column(kind = "json", default = "'{}'")]
    Settings,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PluginRecord {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub version: String,
    pub is_active: bool,
    pub settings: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Plugins;

impl Schema for Plugins {
    const TABLE_NAME: &'static str = "plugins";
    type Column = PluginColumn;
    type Record = PluginRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreatePlugin {
    pub slug: String,
    pub name: String,
    pub version: Option<String>,
    pub settings: Option<serde_json::Value>,
}

impl From<CreatePlugin> for Values<PluginColumn> {
    fn from(plugin: CreatePlugin) -> Self {
        Values::new()
            .set(PluginColumn::Slug, plugin.slug)
            .set(PluginColumn::Name, plugin.name)
            .set_opt(PluginColumn::Version, plugin.version)
            .set_opt(PluginColumn::Settings, plugin.settings)
    }
}

impl<H: Store> Model<Plugins, H> {
    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<PluginRecord>> {
        self.find_first(&[Filter::eq(PluginColumn::Slug, slug)])
            .await
    }

    /// Active plugins in load order (by slug)
    pub async fn find_active(&self) -> ModelResult<Vec<PluginRecord>> {
        self.find_many_where(
            &[Filter::eq(PluginColumn::IsActive, true)],
            FindOptions::default()
                .limit(u64::MAX)
                .order_by(OrderSpec::asc(PluginColumn::Slug)),
        )
        .await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> ModelResult<PluginRecord> {
        self.update(id, Values::new().set(PluginColumn::IsActive, active))
            .await
    }
}
