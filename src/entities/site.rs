//! Sites served by one installation

use serde::{Deserialize, Serialize};

use crate::orm::{Column, Filter, Model, ModelResult, Schema, Store, Values};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteColumn {
    #[column(primary_key)]
    Id,
    Domain,
    #[column(default = "'/'")]
    Path,
    Name,
    #[column(kind = "boolean", default = "1")]
    IsActive,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SiteRecord {
    pub id: String,
    pub domain: String,
    pub path: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Sites;

impl Schema for Sites {
    const TABLE_NAME: &'static str = "sites";
    type Column = SiteColumn;
    type Record = SiteRecord;
}

#[derive(Debug, Clone)]
pub struct CreateSite {
    pub domain: String,
    pub path: Option<String>,
    pub name: String,
}

impl From<CreateSite> for Values<SiteColumn> {
    fn from(site: CreateSite) -> Self {
        Values::new()
            .set(SiteColumn::Domain, site.domain.to_lowercase())
            .set_opt(SiteColumn::Path, site.path)
            .set(SiteColumn::Name, site.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSite {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateSite> for Values<SiteColumn> {
    fn from(update: UpdateSite) -> Self {
        Values::new()
            .set_opt(SiteColumn::Domain, update.domain.map(|d| d.to_lowercase()))
            .set_opt(SiteColumn::Path, update.path)
            .set_opt(SiteColumn::Name, update.name)
            .set_opt(SiteColumn::IsActive, update.is_active)
    }
}

impl<H: Store> Model<Sites, H> {
    /// Domains are stored lowercase, so the lookup is case-insensitive
    pub async fn find_by_domain(&self, domain: &str) -> ModelResult<Option<SiteRecord>> {
        self.find_first(&[Filter::eq(SiteColumn::Domain, domain.to_lowercase())])
            .await
    }
}
