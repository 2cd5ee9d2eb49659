//! Templates: stored layouts pages and posts render through

use serde::{Deserialize, Serialize};

use crate::orm::{Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, Store, Values};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateColumn {
    #[column(primary_key)]
    Id,
    Name,
    Slug,
    /// What the template renders: `page`, `post`, `part`, …
    #[column(default = "'page'")]
    Kind,
    #[column(default = "''")]
    Content,
    /// Owning theme; `NULL` for site-wide templates
    #[column(nullable)]
    ThemeId,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub content: String,
    pub theme_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Templates;

impl Schema for Templates {
    const TABLE_NAME: &'static str = "templates";
    type Column = TemplateColumn;
    type Record = TemplateRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreateTemplate {
    pub name: String,
    pub slug: String,
    pub kind: Option<String>,
    pub content: String,
    pub theme_id: Option<String>,
}

impl From<CreateTemplate> for Values<TemplateColumn> {
    fn from(template: CreateTemplate) -> Self {
        Values::new()
            .set(TemplateColumn::Name, template.name)
            .set(TemplateColumn::Slug, template.slug)
            .set_opt(TemplateColumn::Kind, template.kind)
            .set(TemplateColumn::Content, template.content)
            .set(TemplateColumn::ThemeId, template.theme_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub theme_id: Option<Option<String>>,
}

impl From<UpdateTemplate> for Values<TemplateColumn> {
    fn from(update: UpdateTemplate) -> Self {
        Values::new()
            .set_opt(TemplateColumn::Name, update.name)
            .set_opt(TemplateColumn::Content, update.content)
            .set_opt(TemplateColumn::ThemeId, update.theme_id)
    }
}

impl<H: Store> Model<Templates, H> {
    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<TemplateRecord>> {
        self.find_first(&[Filter::eq(TemplateColumn::Slug, slug)])
            .await
    }

    /// Every template of one kind, by name
    pub async fn find_by_kind(&self, kind: &str) -> ModelResult<Vec<TemplateRecord>> {
        self.find_many_where(
            &[Filter::eq(TemplateColumn::Kind, kind)],
            FindOptions::default()
                .limit(u64::MAX)
                .order_by(OrderSpec::asc(TemplateColumn::Name)),
        )
        .await
    }
}
