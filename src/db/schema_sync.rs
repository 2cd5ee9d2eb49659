//! Table bootstrap from schema definitions
//!
//! - Creates missing tables from [`Schema::create_table_sql`]
//! - Leaves existing tables alone: no column adds, renames or type changes

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::entities::{
    Comments, MediaItems, Pages, Plugins, Posts, Roles, SiteOptions, Sites, Templates, Themes,
    Users,
};
use crate::orm::Schema;

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub errors: Vec<String>,
}

impl SchemaSyncResult {
    fn merge(&mut self, other: SchemaSyncResult) {
        self.tables_created.extend(other.tables_created);
        self.errors.extend(other.errors);
    }
}

/// Check if a table exists in the database
pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Create the table for `S` if it does not exist yet
pub async fn sync_schema<S: Schema>(pool: &SqlitePool) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();
    let table_name = S::TABLE_NAME;

    if table_exists(pool, table_name).await? {
        debug!(table = table_name, "Table already exists");
        return Ok(result);
    }

    let create_sql = S::create_table_sql();
    debug!("Creating table {}: {}", table_name, create_sql);

    match sqlx::query(&create_sql).execute(pool).await {
        Ok(_) => {
            info!("Created table: {}", table_name);
            result.tables_created.push(table_name.to_string());
        }
        Err(e) => {
            let msg = format!("Failed to create table {}: {}", table_name, e);
            warn!("{}", msg);
            result.errors.push(msg);
        }
    }

    Ok(result)
}

/// Create every entity table that is missing.
///
/// Failures are collected per table rather than aborting the run.
pub async fn sync_all_schemas(pool: &SqlitePool) -> SchemaSyncResult {
    let mut total_result = SchemaSyncResult::default();

    macro_rules! sync_one {
        ($schema:ty) => {
            match sync_schema::<$schema>(pool).await {
                Ok(result) => total_result.merge(result),
                Err(e) => {
                    total_result.errors.push(format!(
                        "Error syncing {}: {}",
                        <$schema as Schema>::TABLE_NAME,
                        e
                    ));
                }
            }
        };
    }

    sync_one!(Users);
    sync_one!(Roles);
    sync_one!(Sites);
    sync_one!(Posts);
    sync_one!(Pages);
    sync_one!(Comments);
    sync_one!(MediaItems);
    sync_one!(Templates);
    sync_one!(Themes);
    sync_one!(Plugins);
    sync_one!(SiteOptions);

    if total_result.errors.is_empty() {
        info!(
            tables_created = total_result.tables_created.len(),
            "Schema sync complete"
        );
    } else {
        warn!(
            errors = total_result.errors.len(),
            "Schema sync finished with errors"
        );
    }

    total_result
}
