//! Storage handles the façade runs statements through
//!
//! A [`Store`] is either the pooled [`Database`](crate::db::Database) or a
//! [`TxHandle`] scoped to one transaction. Models are generic over the two so the
//! same operations work inside and outside a transaction.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use super::builder::CompiledQuery;
use super::error::{ModelError, ModelResult};

/// Something that can run a compiled statement.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_all(&self, query: &CompiledQuery) -> ModelResult<Vec<SqliteRow>>;

    async fn fetch_optional(&self, query: &CompiledQuery) -> ModelResult<Option<SqliteRow>>;

    /// Run a statement, returning the number of rows affected
    async fn execute(&self, query: &CompiledQuery) -> ModelResult<u64>;
}

fn trace(query: &CompiledQuery) {
    debug!(sql = %query.sql, params = query.params.len(), "Executing statement");
}

#[async_trait]
impl Store for SqlitePool {
    async fn fetch_all(&self, query: &CompiledQuery) -> ModelResult<Vec<SqliteRow>> {
        trace(query);
        Ok(query.as_query().fetch_all(self).await?)
    }

    async fn fetch_optional(&self, query: &CompiledQuery) -> ModelResult<Option<SqliteRow>> {
        trace(query);
        Ok(query.as_query().fetch_optional(self).await?)
    }

    async fn execute(&self, query: &CompiledQuery) -> ModelResult<u64> {
        trace(query);
        Ok(query.as_query().execute(self).await?.rows_affected())
    }
}

/// Handle to an open transaction.
///
/// Cloning shares the same transaction. Statements are serialized through an async
/// mutex. Once the transaction is committed or rolled back every clone fails with
/// [`ModelError::TransactionClosed`].
#[derive(Clone)]
pub struct TxHandle {
    inner: Arc<Mutex<Option<Transaction<'static, Sqlite>>>>,
}

impl TxHandle {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    pub async fn commit(&self) -> ModelResult<()> {
        let tx = self
            .inner
            .lock()
            .await
            .take()
            .ok_or(ModelError::TransactionClosed)?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> ModelResult<()> {
        let tx = self
            .inner
            .lock()
            .await
            .take()
            .ok_or(ModelError::TransactionClosed)?;
        tx.rollback().await?;
        Ok(())
    }
}

impl std::fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxHandle").finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for TxHandle {
    async fn fetch_all(&self, query: &CompiledQuery) -> ModelResult<Vec<SqliteRow>> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or(ModelError::TransactionClosed)?;
        trace(query);
        Ok(query.as_query().fetch_all(&mut **tx).await?)
    }

    async fn fetch_optional(&self, query: &CompiledQuery) -> ModelResult<Option<SqliteRow>> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or(ModelError::TransactionClosed)?;
        trace(query);
        Ok(query.as_query().fetch_optional(&mut **tx).await?)
    }

    async fn execute(&self, query: &CompiledQuery) -> ModelResult<u64> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or(ModelError::TransactionClosed)?;
        trace(query);
        Ok(query.as_query().execute(&mut **tx).await?.rows_affected())
    }
}
