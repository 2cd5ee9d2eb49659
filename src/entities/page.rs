//! Pages: hierarchical, menu-ordered content

use serde::{Deserialize, Serialize};

use super::post::PublishStatus;
use crate::db::sqlite_helpers::now_iso8601;
use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, SqlValue, Store, Values,
};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageColumn {
    #[column(primary_key)]
    Id,
    #[column(nullable)]
    AuthorId,
    /// Parent page id; `NULL` for top-level pages
    #[column(nullable)]
    ParentId,
    Title,
    Slug,
    #[column(default = "''")]
    Content,
    /// Slug of the template used to render the page
    #[column(nullable)]
    Template,
    #[column(default = "'draft'")]
    Status,
    #[column(kind = "integer", default = "0")]
    MenuOrder,
    #[column(kind = "timestamp", nullable)]
    PublishedAt,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PageRecord {
    pub id: String,
    pub author_id: Option<String>,
    pub parent_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub template: Option<String>,
    pub status: String,
    pub menu_order: i64,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Pages;

impl Schema for Pages {
    const TABLE_NAME: &'static str = "pages";
    type Column = PageColumn;
    type Record = PageRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreatePage {
    pub author_id: Option<String>,
    pub parent_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub template: Option<String>,
    pub status: Option<PublishStatus>,
    pub menu_order: i64,
}

impl From<CreatePage> for Values<PageColumn> {
    fn from(page: CreatePage) -> Self {
        Values::new()
            .set(PageColumn::AuthorId, page.author_id)
            .set(PageColumn::ParentId, page.parent_id)
            .set(PageColumn::Title, page.title)
            .set(PageColumn::Slug, page.slug)
            .set(PageColumn::Content, page.content)
            .set(PageColumn::Template, page.template)
            .set_opt(PageColumn::Status, page.status)
            .set(PageColumn::MenuOrder, page.menu_order)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePage {
    pub parent_id: Option<Option<String>>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub template: Option<Option<String>>,
    pub status: Option<PublishStatus>,
    pub menu_order: Option<i64>,
}

impl From<UpdatePage> for Values<PageColumn> {
    fn from(update: UpdatePage) -> Self {
        Values::new()
            .set_opt(PageColumn::ParentId, update.parent_id)
            .set_opt(PageColumn::Title, update.title)
            .set_opt(PageColumn::Slug, update.slug)
            .set_opt(PageColumn::Content, update.content)
            .set_opt(PageColumn::Template, update.template)
            .set_opt(PageColumn::Status, update.status)
            .set_opt(PageColumn::MenuOrder, update.menu_order)
    }
}

impl<H: Store> Model<Pages, H> {
    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<PageRecord>> {
        self.find_first(&[Filter::eq(PageColumn::Slug, slug)]).await
    }

    /// Mark a page published, stamping `published_at` the first time only
    pub async fn publish(&self, id: &str) -> ModelResult<PageRecord> {
        self.update_filling(
            id,
            Values::new().set(PageColumn::Status, PublishStatus::Publish),
            Values::new().set(PageColumn::PublishedAt, now_iso8601()),
        )
        .await
    }

    /// Direct children of `parent_id` (top-level pages for `None`) in menu order
    pub async fn find_children(&self, parent_id: Option<&str>) -> ModelResult<Vec<PageRecord>> {
        let parent = match parent_id {
            Some(id) => SqlValue::from(id),
            None => SqlValue::Null,
        };
        self.find_many_where(
            &[Filter::eq(PageColumn::ParentId, parent)],
            FindOptions::default()
                .limit(u64::MAX)
                .order_by(OrderSpec::raw("\"menu_order\" ASC, \"title\" ASC")),
        )
        .await
    }
}
