//! Database connection and transactions

pub mod schema_sync;
pub mod sqlite_helpers;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use tracing::{info, warn};

use crate::config::Config;
use crate::entities::Models;
use crate::orm::{CompiledQuery, Model, ModelError, ModelResult, Schema, Store, TxHandle};

pub use schema_sync::SchemaSyncResult;

/// Database wrapper providing connection pool access
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn connect_options(config: &Config) -> Result<SqliteConnectOptions> {
        let options = if config.database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&config.database_url)
                .with_context(|| format!("Invalid database URL {}", config.database_url))?
        } else {
            SqliteConnectOptions::new().filename(&config.database_url)
        };

        Ok(options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5)))
    }

    fn pool_options(config: &Config) -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
    }

    /// Create a new database connection pool
    pub async fn connect(config: &Config) -> Result<Self> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", config.database_url))?;

        info!(
            url = %config.database_url,
            max_connections = config.max_connections,
            "Database connected"
        );
        Ok(Self { pool })
    }

    /// Create a new database connection pool with retry logic.
    /// Retries every `config.retry_interval` until successful; only a malformed URL fails.
    pub async fn connect_with_retry(config: &Config) -> Result<Self> {
        let options = Self::connect_options(config)?;
        loop {
            match Self::pool_options(config)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => {
                    info!(url = %config.database_url, "Database connected");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        retry_in_secs = config.retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(config.retry_interval).await;
                }
            }
        }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every entity model bound to the pool
    pub fn models(&self) -> Models<Database> {
        Models::new(self.clone())
    }

    /// A model for any schema bound to the pool
    pub fn model<S: Schema>(&self) -> Model<S> {
        Model::new(self.clone())
    }

    /// Open a transaction. Prefer [`Database::with_transaction`], which always
    /// finishes it.
    ///
    /// Starts with `BEGIN IMMEDIATE`: the write lock is taken up front, waiting out
    /// other writers under the busy timeout instead of failing on a later upgrade.
    pub async fn begin(&self) -> ModelResult<TxHandle> {
        Ok(TxHandle::new(self.pool.begin_with("BEGIN IMMEDIATE").await?))
    }

    /// Run `f` inside one transaction.
    ///
    /// `Ok` commits and `Err` rolls back; either way the callback's result is
    /// returned. A handle the callback already finished is left as is.
    ///
    /// ```rust,ignore
    /// db.with_transaction(|tx| async move {
    ///     let models = Models::new(tx);
    ///     let post = models.posts.create(new_post.into()).await?;
    ///     models.comments.create(first_comment(&post.id).into()).await?;
    ///     Ok::<_, ModelError>(post)
    /// })
    /// .await?;
    /// ```
    pub async fn with_transaction<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(TxHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ModelError>,
    {
        let tx = self.begin().await?;

        match f(tx.clone()).await {
            Ok(value) => {
                if tx.is_open().await {
                    tx.commit().await?;
                }
                Ok(value)
            }
            Err(err) => {
                if tx.is_open().await {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Transaction rollback failed");
                    }
                }
                Err(err)
            }
        }
    }

    /// Create the table for one schema if it is missing
    pub async fn sync_schema<S: Schema>(&self) -> Result<SchemaSyncResult> {
        schema_sync::sync_schema::<S>(&self.pool)
            .await
            .with_context(|| format!("Failed to sync table {}", S::TABLE_NAME))
    }

    /// Create every missing entity table
    pub async fn sync_all_schemas(&self) -> SchemaSyncResult {
        schema_sync::sync_all_schemas(&self.pool).await
    }

    /// Check the pool can run a statement
    pub async fn health(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for Database {
    async fn fetch_all(&self, query: &CompiledQuery) -> ModelResult<Vec<SqliteRow>> {
        Store::fetch_all(&self.pool, query).await
    }

    async fn fetch_optional(&self, query: &CompiledQuery) -> ModelResult<Option<SqliteRow>> {
        Store::fetch_optional(&self.pool, query).await
    }

    async fn execute(&self, query: &CompiledQuery) -> ModelResult<u64> {
        Store::execute(&self.pool, query).await
    }
}
