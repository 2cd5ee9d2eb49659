//! Posts: dated, authored content entries

use serde::{Deserialize, Serialize};

use crate::db::sqlite_helpers::now_iso8601;
use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, SqlValue, Store, Values,
};

/// Publication state shared by posts and pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Pending,
    Publish,
    Private,
    Trash,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Pending => "pending",
            PublishStatus::Publish => "publish",
            PublishStatus::Private => "private",
            PublishStatus::Trash => "trash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PublishStatus::Draft),
            "pending" => Some(PublishStatus::Pending),
            "publish" => Some(PublishStatus::Publish),
            "private" => Some(PublishStatus::Private),
            "trash" => Some(PublishStatus::Trash),
            _ => None,
        }
    }
}

impl From<PublishStatus> for SqlValue {
    fn from(status: PublishStatus) -> Self {
        SqlValue::from(status.as_str())
    }
}

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostColumn {
    #[column(primary_key)]
    Id,
    AuthorId,
    Title,
    Slug,
    #[column(default = "''")]
    Content,
    #[column(nullable)]
    Excerpt,
    #[column(default = "'draft'")]
    Status,
    #[column(kind = "boolean", default = "1")]
    CommentsOpen,
    #[column(kind = "timestamp", nullable)]
    PublishedAt,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRecord {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: String,
    pub comments_open: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PostRecord {
    pub fn status(&self) -> Option<PublishStatus> {
        PublishStatus::parse(&self.status)
    }

    pub fn is_published(&self) -> bool {
        self.status() == Some(PublishStatus::Publish)
    }
}

pub struct Posts;

impl Schema for Posts {
    const TABLE_NAME: &'static str = "posts";
    type Column = PostColumn;
    type Record = PostRecord;
}

#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    /// Defaults to draft
    pub status: Option<PublishStatus>,
}

impl From<CreatePost> for Values<PostColumn> {
    fn from(post: CreatePost) -> Self {
        Values::new()
            .set(PostColumn::AuthorId, post.author_id)
            .set(PostColumn::Title, post.title)
            .set(PostColumn::Slug, post.slug)
            .set(PostColumn::Content, post.content)
            .set(PostColumn::Excerpt, post.excerpt)
            .set_opt(PostColumn::Status, post.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub status: Option<PublishStatus>,
    pub comments_open: Option<bool>,
}

impl From<UpdatePost> for Values<PostColumn> {
    fn from(update: UpdatePost) -> Self {
        Values::new()
            .set_opt(PostColumn::Title, update.title)
            .set_opt(PostColumn::Slug, update.slug)
            .set_opt(PostColumn::Content, update.content)
            .set_opt(PostColumn::Excerpt, update.excerpt)
            .set_opt(PostColumn::Status, update.status)
            .set_opt(PostColumn::CommentsOpen, update.comments_open)
    }
}

impl<H: Store> Model<Posts, H> {
    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<PostRecord>> {
        self.find_first(&[Filter::eq(PostColumn::Slug, slug)]).await
    }

    /// Mark a post published, stamping `published_at` the first time only
    pub async fn publish(&self, id: &str) -> ModelResult<PostRecord> {
        self.update_filling(
            id,
            Values::new().set(PostColumn::Status, PublishStatus::Publish),
            Values::new().set(PostColumn::PublishedAt, now_iso8601()),
        )
        .await
    }

    /// Published posts, most recently published first unless the options say otherwise
    pub async fn find_published(
        &self,
        options: FindOptions<PostColumn>,
    ) -> ModelResult<Vec<PostRecord>> {
        let options = if options.order.is_some() {
            options
        } else {
            options.order_by(OrderSpec::desc(PostColumn::PublishedAt))
        };
        self.find_many_where(
            &[Filter::eq(PostColumn::Status, PublishStatus::Publish)],
            options,
        )
        .await
    }

    pub async fn count_by_status(&self, status: PublishStatus) -> ModelResult<i64> {
        self.count(&[Filter::eq(PostColumn::Status, status)]).await
    }
}
