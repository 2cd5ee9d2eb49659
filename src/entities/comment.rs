//! Comments left on posts, with moderation state

use serde::{Deserialize, Serialize};

use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, SqlValue, Store, Values,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Spam,
    Trash,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Spam => "spam",
            CommentStatus::Trash => "trash",
        }
    }
}

impl From<CommentStatus> for SqlValue {
    fn from(status: CommentStatus) -> Self {
        SqlValue::from(status.as_str())
    }
}

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentColumn {
    #[column(primary_key)]
    Id,
    PostId,
    /// Reply target; `NULL` for top-level comments
    #[column(nullable)]
    ParentId,
    /// Registered author, if any
    #[column(nullable)]
    UserId,
    AuthorName,
    #[column(nullable)]
    AuthorEmail,
    Content,
    #[column(default = "'pending'")]
    Status,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub user_id: Option<String>,
    pub author_name: String,
    pub author_email: Option<String>,
    pub content: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Comments;

impl Schema for Comments {
    const TABLE_NAME: &'static str = "comments";
    type Column = CommentColumn;
    type Record = CommentRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreateComment {
    pub post_id: String,
    pub parent_id: Option<String>,
    pub user_id: Option<String>,
    pub author_name: String,
    pub author_email: Option<String>,
    pub content: String,
}

impl From<CreateComment> for Values<CommentColumn> {
    fn from(comment: CreateComment) -> Self {
        Values::new()
            .set(CommentColumn::PostId, comment.post_id)
            .set(CommentColumn::ParentId, comment.parent_id)
            .set(CommentColumn::UserId, comment.user_id)
            .set(CommentColumn::AuthorName, comment.author_name)
            .set(CommentColumn::AuthorEmail, comment.author_email)
            .set(CommentColumn::Content, comment.content)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateComment {
    pub content: Option<String>,
    pub status: Option<CommentStatus>,
}

impl From<UpdateComment> for Values<CommentColumn> {
    fn from(update: UpdateComment) -> Self {
        Values::new()
            .set_opt(CommentColumn::Content, update.content)
            .set_opt(CommentColumn::Status, update.status)
    }
}

impl<H: Store> Model<Comments, H> {
    pub async fn approve(&self, id: &str) -> ModelResult<CommentRecord> {
        self.update(
            id,
            Values::new().set(CommentColumn::Status, CommentStatus::Approved),
        )
        .await
    }

    /// Approved comments on a post, oldest first
    pub async fn find_for_post(
        &self,
        post_id: &str,
        options: FindOptions<CommentColumn>,
    ) -> ModelResult<Vec<CommentRecord>> {
        let options = if options.order.is_some() {
            options
        } else {
            options.order_by(OrderSpec::asc(CommentColumn::CreatedAt))
        };
        self.find_many_where(
            &[
                Filter::eq(CommentColumn::PostId, post_id),
                Filter::eq(CommentColumn::Status, CommentStatus::Approved),
            ],
            options,
        )
        .await
    }

    /// Comments awaiting moderation across all posts
    pub async fn count_pending(&self) -> ModelResult<i64> {
        self.count(&[Filter::eq(CommentColumn::Status, CommentStatus::Pending)])
            .await
    }
}
