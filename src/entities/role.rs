//! Roles and their capability lists

use serde::{Deserialize, Serialize};

use crate::db::sqlite_helpers::{json_to_vec, vec_to_json};
use crate::orm::{Column, Filter, Model, ModelResult, Schema, Store, Values};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleColumn {
    #[column(primary_key)]
    Id,
    Slug,
    Name,
    /// JSON array of capability names
    #[column(kind = "json", default = "'[]'")]
    Capabilities,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleRecord {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub capabilities: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RoleRecord {
    /// Decoded capabilities; malformed JSON reads as no capabilities
    pub fn capability_list(&self) -> Vec<String> {
        json_to_vec(&self.capabilities)
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capability_list().iter().any(|c| c == capability)
    }
}

pub struct Roles;

impl Schema for Roles {
    const TABLE_NAME: &'static str = "roles";
    type Column = RoleColumn;
    type Record = RoleRecord;
}

#[derive(Debug, Clone)]
pub struct CreateRole {
    pub slug: String,
    pub name: String,
    pub capabilities: Vec<String>,
}

impl From<CreateRole> for Values<RoleColumn> {
    fn from(role: CreateRole) -> Self {
        Values::new()
            .set(RoleColumn::Slug, role.slug)
            .set(RoleColumn::Name, role.name)
            .set(RoleColumn::Capabilities, vec_to_json(&role.capabilities))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub capabilities: Option<Vec<String>>,
}

impl From<UpdateRole> for Values<RoleColumn> {
    fn from(update: UpdateRole) -> Self {
        Values::new()
            .set_opt(RoleColumn::Name, update.name)
            .set_opt(
                RoleColumn::Capabilities,
                update.capabilities.map(|c| vec_to_json(&c)),
            )
    }
}

impl<H: Store> Model<Roles, H> {
    pub async fn find_by_slug(&self, slug: &str) -> ModelResult<Option<RoleRecord>> {
        self.find_first(&[Filter::eq(RoleColumn::Slug, slug)]).await
    }
}
