//! Media library: uploaded files and their metadata

use serde::{Deserialize, Serialize};

use crate::orm::{Column, Filter, FindOptions, Model, ModelResult, Schema, Store, Values};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaColumn {
    #[column(primary_key)]
    Id,
    FileName,
    MimeType,
    #[column(kind = "integer", default = "0")]
    FileSize,
    Url,
    #[column(nullable)]
    AltText,
    #[column(nullable)]
    Caption,
    #[column(nullable)]
    UploadedBy,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediaRecord {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub url: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub uploaded_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MediaItems;

impl Schema for MediaItems {
    const TABLE_NAME: &'static str = "media";
    type Column = MediaColumn;
    type Record = MediaRecord;
}

#[derive(Debug, Clone, Default)]
pub struct CreateMedia {
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub url: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub uploaded_by: Option<String>,
}

impl From<CreateMedia> for Values<MediaColumn> {
    fn from(media: CreateMedia) -> Self {
        Values::new()
            .set(MediaColumn::FileName, media.file_name)
            .set(MediaColumn::MimeType, media.mime_type)
            .set(MediaColumn::FileSize, media.file_size)
            .set(MediaColumn::Url, media.url)
            .set(MediaColumn::AltText, media.alt_text)
            .set(MediaColumn::Caption, media.caption)
            .set(MediaColumn::UploadedBy, media.uploaded_by)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMedia {
    pub alt_text: Option<Option<String>>,
    pub caption: Option<Option<String>>,
}

impl From<UpdateMedia> for Values<MediaColumn> {
    fn from(update: UpdateMedia) -> Self {
        Values::new()
            .set_opt(MediaColumn::AltText, update.alt_text)
            .set_opt(MediaColumn::Caption, update.caption)
    }
}

impl<H: Store> Model<MediaItems, H> {
    pub async fn find_by_file_name(&self, file_name: &str) -> ModelResult<Option<MediaRecord>> {
        self.find_first(&[Filter::eq(MediaColumn::FileName, file_name)])
            .await
    }

    /// Media whose MIME type starts with `prefix`, e.g. `"image/"`. Case-sensitive;
    /// `%` and `_` inside `prefix` act as wildcards.
    pub async fn find_by_mime_prefix(
        &self,
        prefix: &str,
        options: FindOptions<MediaColumn>,
    ) -> ModelResult<Vec<MediaRecord>> {
        self.find_many_where(&[Filter::like(MediaColumn::MimeType, format!("{prefix}%"))], options)
            .await
    }
}
