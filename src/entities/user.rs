//! Users: accounts that author content and administer sites

use serde::{Deserialize, Serialize};

use crate::db::sqlite_helpers::now_iso8601;
use crate::orm::{
    Column, Filter, FindOptions, Model, ModelResult, OrderSpec, RawExpr, Schema, Store, Values,
};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserColumn {
    #[column(primary_key)]
    Id,
    Username,
    #[column(nullable)]
    Email,
    PasswordHash,
    #[column(nullable)]
    DisplayName,
    #[column(default = "'subscriber'")]
    Role,
    #[column(kind = "boolean", default = "1")]
    IsActive,
    #[column(kind = "timestamp", nullable)]
    LastLoginAt,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct Users;

impl Schema for Users {
    const TABLE_NAME: &'static str = "users";
    type Column = UserColumn;
    type Record = UserRecord;
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub display_name: Option<String>,
    /// Role slug; the column default applies when `None`
    pub role: Option<String>,
}

impl From<CreateUser> for Values<UserColumn> {
    fn from(user: CreateUser) -> Self {
        Values::new()
            .set(UserColumn::Username, user.username)
            .set(UserColumn::Email, user.email)
            .set(UserColumn::PasswordHash, user.password_hash)
            .set(UserColumn::DisplayName, user.display_name)
            .set_opt(UserColumn::Role, user.role)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub display_name: Option<Option<String>>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub last_login_at: Option<String>,
}

impl From<UpdateUser> for Values<UserColumn> {
    fn from(update: UpdateUser) -> Self {
        Values::new()
            .set_opt(UserColumn::Username, update.username)
            .set_opt(UserColumn::Email, update.email)
            .set_opt(UserColumn::PasswordHash, update.password_hash)
            .set_opt(UserColumn::DisplayName, update.display_name)
            .set_opt(UserColumn::Role, update.role)
            .set_opt(UserColumn::IsActive, update.is_active)
            .set_opt(UserColumn::LastLoginAt, update.last_login_at)
    }
}

impl<H: Store> Model<Users, H> {
    pub async fn find_by_username(&self, username: &str) -> ModelResult<Option<UserRecord>> {
        self.find_first(&[Filter::eq(UserColumn::Username, username)])
            .await
    }

    /// Case-insensitive email lookup
    pub async fn find_by_email(&self, email: &str) -> ModelResult<Option<UserRecord>> {
        self.find_first(&[Filter::raw(
            RawExpr::new("LOWER(\"email\") = LOWER(?)").bind(email),
        )])
        .await
    }

    /// Active users ordered by username unless the options say otherwise
    pub async fn find_active(
        &self,
        options: FindOptions<UserColumn>,
    ) -> ModelResult<Vec<UserRecord>> {
        let options = if options.order.is_some() {
            options
        } else {
            options.order_by(OrderSpec::asc(UserColumn::Username))
        };
        self.find_many_where(&[Filter::eq(UserColumn::IsActive, true)], options)
            .await
    }

    /// Stamp the last successful login
    pub async fn record_login(&self, id: &str) -> ModelResult<UserRecord> {
        self.update(
            id,
            Values::new().set(UserColumn::LastLoginAt, now_iso8601()),
        )
        .await
    }
}
