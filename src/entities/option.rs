//! Site options: a key/value store keyed by option name

use serde::{Deserialize, Serialize};

use crate::orm::{Column, Filter, FindOptions, Model, ModelResult, OrderSpec, Schema, Store, Values};

#[derive(Column, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionColumn {
    /// The option name doubles as the primary key
    #[column(primary_key)]
    Name,
    #[column(default = "''")]
    Value,
    /// Loaded with every request when set
    #[column(kind = "boolean", default = "1")]
    Autoload,
    #[column(created_at)]
    CreatedAt,
    #[column(updated_at)]
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OptionRecord {
    pub name: String,
    pub value: String,
    pub autoload: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct SiteOptions;

impl Schema for SiteOptions {
    const TABLE_NAME: &'static str = "options";
    type Column = OptionColumn;
    type Record = OptionRecord;
}

impl<H: Store> Model<SiteOptions, H> {
    /// The option's value, `None` when unset
    pub async fn get_option(&self, name: &str) -> ModelResult<Option<String>> {
        Ok(self.find_by_id(name).await?.map(|option| option.value))
    }

    /// Create or overwrite an option. `autoload` is only changed when given.
    pub async fn set_option(
        &self,
        name: &str,
        value: impl Into<String>,
        autoload: Option<bool>,
    ) -> ModelResult<OptionRecord> {
        self.upsert(
            Values::new()
                .set(OptionColumn::Name, name)
                .set(OptionColumn::Value, value.into())
                .set_opt(OptionColumn::Autoload, autoload),
        )
        .await
    }

    pub async fn delete_option(&self, name: &str) -> ModelResult<()> {
        self.delete(name).await
    }

    /// Every autoloaded option, by name
    pub async fn find_autoload(&self) -> ModelResult<Vec<OptionRecord>> {
        self.find_many_where(
            &[Filter::eq(OptionColumn::Autoload, true)],
            FindOptions::default()
                .limit(u64::MAX)
                .order_by(OrderSpec::asc(OptionColumn::Name)),
        )
        .await
    }
}
