//! Model operations façade
//!
//! One generic [`Model`] gives every schema the same read/write operations.
//! Entity modules add semantic helpers on top in `impl<H: Store> Model<Posts, H>`
//! blocks, built only from the operations here.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use scriptorium::entities::post::{PostColumn, Posts};
//! use scriptorium::orm::{Filter, FindOptions, Model, OrderSpec};
//!
//! let posts: Model<Posts> = Model::new(db.clone());
//!
//! let drafts = posts
//!     .find_many_where(
//!         &[Filter::eq(PostColumn::Status, "draft")],
//!         FindOptions::default().limit(10).order_by(OrderSpec::asc(PostColumn::Title)),
//!     )
//!     .await?;
//!
//! let total = posts.count(&[]).await?;
//! ```

use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::builder::{
    CompiledQuery, EntityQuery, build_delete_by_id, build_insert, build_update, build_update_filling,
    build_upsert,
};
use super::error::{ModelError, ModelResult};
use super::filter::{Filter, PropertyFilter};
use super::order::OrderSpec;
use super::pagination::Page;
use super::schema::{Column, Schema};
use super::store::Store;
use super::value::{SqlValue, Values};
use crate::db::Database;
use crate::db::sqlite_helpers::{new_id, now_iso8601};

/// Page size used when the caller gives none
pub const DEFAULT_LIMIT: u64 = 50;

/// Pagination, ordering and an optional single-column filter for list queries.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions<C> {
    pub filter: Option<PropertyFilter<C>>,
    pub limit: u64,
    pub offset: u64,
    /// `None` orders newest first when the schema has a creation timestamp
    pub order: Option<OrderSpec<C>>,
}

impl<C> Default for FindOptions<C> {
    fn default() -> Self {
        Self {
            filter: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
            order: None,
        }
    }
}

impl<C: Column> FindOptions<C> {
    pub fn filter(mut self, filter: PropertyFilter<C>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn order_by(mut self, order: OrderSpec<C>) -> Self {
        self.order = Some(order);
        self
    }
}

/// Data access for one schema through one store handle.
///
/// Holds nothing but the handle, so it is cheap to clone and safe to share.
pub struct Model<S: Schema, H: Store = Database> {
    store: H,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema, H: Store + Clone> Clone for Model<S, H> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<S: Schema, H: Store> std::fmt::Debug for Model<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("table", &S::TABLE_NAME).finish()
    }
}

impl<S: Schema, H: Store> Model<S, H> {
    pub fn new(store: H) -> Self {
        Self {
            store,
            _schema: PhantomData,
        }
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    pub fn table_name(&self) -> &'static str {
        S::TABLE_NAME
    }

    fn decode(row: &SqliteRow) -> ModelResult<S::Record> {
        Ok(S::Record::from_row(row)?)
    }

    fn not_found(id: &str) -> ModelError {
        ModelError::NotFound {
            table: S::TABLE_NAME,
            id: id.to_string(),
        }
    }

    fn list_query(
        filters: &[Filter<S::Column>],
        options: &FindOptions<S::Column>,
    ) -> ModelResult<EntityQuery<S>> {
        let mut query = EntityQuery::<S>::new().filter(filters)?;
        if let Some(filter) = &options.filter {
            query = query.filter(&[Filter::Property(filter.clone())])?;
        }
        Ok(query)
    }

    async fn fetch_returning(&self, query: &CompiledQuery) -> ModelResult<Option<S::Record>> {
        match self.store.fetch_optional(query).await? {
            Some(row) => Ok(Some(Self::decode(&row)?)),
            None => Ok(None),
        }
    }

    /// Look up one record by primary key.
    pub async fn find_by_id(&self, id: &str) -> ModelResult<Option<S::Record>> {
        let query = EntityQuery::<S>::new()
            .filter(&[Filter::eq(S::Column::primary_key(), id)])?
            .limit(1)
            .build_select();
        self.fetch_returning(&query).await
    }

    /// List records, optionally narrowed by the single filter in `options`.
    pub async fn find_many(&self, options: FindOptions<S::Column>) -> ModelResult<Vec<S::Record>> {
        self.find_many_where(&[], options).await
    }

    /// List records matching every filter.
    pub async fn find_many_where(
        &self,
        filters: &[Filter<S::Column>],
        options: FindOptions<S::Column>,
    ) -> ModelResult<Vec<S::Record>> {
        let query = Self::list_query(filters, &options)?
            .order_by(options.order.as_ref())?
            .limit(options.limit)
            .offset(options.offset)
            .build_select();
        let rows = self.store.fetch_all(&query).await?;
        rows.iter().map(Self::decode).collect()
    }

    /// First record in default order matching every filter.
    pub async fn find_first(&self, filters: &[Filter<S::Column>]) -> ModelResult<Option<S::Record>> {
        let records = self
            .find_many_where(filters, FindOptions::default().limit(1))
            .await?;
        Ok(records.into_iter().next())
    }

    /// Records whose primary key is in `ids`, newest first.
    pub async fn find_many_by_ids<I, V>(&self, ids: I) -> ModelResult<Vec<S::Record>>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let ids: Vec<SqlValue> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let limit = u64::try_from(ids.len()).unwrap_or(u64::MAX);
        self.find_many_where(
            &[Filter::is_in(S::Column::primary_key(), ids)],
            FindOptions::default().limit(limit),
        )
        .await
    }

    /// Number of records matching every filter.
    pub async fn count(&self, filters: &[Filter<S::Column>]) -> ModelResult<i64> {
        let query = EntityQuery::<S>::new().filter(filters)?.build_count();
        self.count_query(&query).await
    }

    async fn count_query(&self, query: &CompiledQuery) -> ModelResult<i64> {
        match self.store.fetch_optional(query).await? {
            Some(row) => Ok(row.try_get::<i64, _>(0)?),
            None => Ok(0),
        }
    }

    pub async fn exists(&self, filters: &[Filter<S::Column>]) -> ModelResult<bool> {
        Ok(self.count(filters).await? > 0)
    }

    /// One page of records plus the unpaginated total.
    pub async fn find_page(
        &self,
        filters: &[Filter<S::Column>],
        options: FindOptions<S::Column>,
    ) -> ModelResult<Page<S::Record>> {
        let base = Self::list_query(filters, &options)?;
        let total = self.count_query(&base.build_count()).await?;
        let offset = options.offset;
        let query = base
            .order_by(options.order.as_ref())?
            .limit(options.limit)
            .offset(offset)
            .build_select();
        let rows = self.store.fetch_all(&query).await?;
        let items = rows.iter().map(Self::decode).collect::<ModelResult<Vec<_>>>()?;
        Ok(Page::from_items(items, offset, total))
    }

    /// Insert one record.
    ///
    /// A missing or `Null` primary key gets a fresh UUID; missing or `Null` timestamps
    /// get the current time.
    pub async fn create(&self, values: Values<S::Column>) -> ModelResult<S::Record> {
        let mut values = values;
        values.insert_default(S::Column::primary_key(), new_id());
        let now = now_iso8601();
        for column in [S::Column::created_at(), S::Column::updated_at()]
            .into_iter()
            .flatten()
        {
            values.insert_default(column, now.clone());
        }

        self.fetch_returning(&build_insert::<S>(&values))
            .await?
            .ok_or(ModelError::Store(sqlx::Error::RowNotFound))
    }

    /// Apply `values` to the record with primary key `id`.
    ///
    /// The primary key is never rewritten and the modification timestamp is always
    /// refreshed. Fails with [`ModelError::NotFound`] when no such record exists.
    pub async fn update(&self, id: &str, values: Values<S::Column>) -> ModelResult<S::Record> {
        let mut values = values;
        values.remove(S::Column::primary_key());
        if let Some(updated_at) = S::Column::updated_at() {
            values.insert(updated_at, now_iso8601());
        }

        if values.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| Self::not_found(id));
        }

        self.fetch_returning(&build_update::<S>(id, &values))
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Like [`Model::update`], but each column in `fill` is only written where the row
    /// holds `NULL`. Runs as one statement, so concurrent callers cannot both fill it.
    pub async fn update_filling(
        &self,
        id: &str,
        values: Values<S::Column>,
        fill: Values<S::Column>,
    ) -> ModelResult<S::Record> {
        let mut values = values;
        let mut fill = fill;
        let primary_key = S::Column::primary_key();
        values.remove(primary_key);
        fill.remove(primary_key);
        if let Some(updated_at) = S::Column::updated_at() {
            values.insert(updated_at, now_iso8601());
        }
        for column in values.columns().collect::<Vec<_>>() {
            fill.remove(column);
        }

        if values.is_empty() && fill.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| Self::not_found(id));
        }

        self.fetch_returning(&build_update_filling::<S>(id, &values, &fill))
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Remove the record with primary key `id`; succeeds when it is already gone.
    pub async fn delete(&self, id: &str) -> ModelResult<()> {
        self.store.execute(&build_delete_by_id::<S>(id)).await?;
        Ok(())
    }

    /// Remove every record matching the filters. An empty list removes nothing.
    pub async fn delete_where(&self, filters: &[Filter<S::Column>]) -> ModelResult<u64> {
        if filters.is_empty() {
            return Ok(0);
        }
        let query = EntityQuery::<S>::new().filter(filters)?.build_delete();
        self.store.execute(&query).await
    }

    /// Insert, or overwrite the supplied columns when the primary key already exists.
    ///
    /// A creation timestamp the caller supplies is written by both branches; one
    /// filled in here is only written by the insert branch.
    pub async fn upsert(&self, values: Values<S::Column>) -> ModelResult<S::Record> {
        let mut values = values;
        let primary_key = S::Column::primary_key();
        if values.get(primary_key).is_none_or(SqlValue::is_null) {
            return Err(ModelError::MissingPrimaryKey {
                table: S::TABLE_NAME,
            });
        }

        let now = now_iso8601();
        let mut generated_created_at = None;
        if let Some(column) = S::Column::created_at() {
            if values.get(column).is_none_or(SqlValue::is_null) {
                values.insert(column, now.clone());
                generated_created_at = Some(column);
            }
        }
        if let Some(column) = S::Column::updated_at() {
            values.insert(column, now);
        }

        let update_columns: Vec<S::Column> = values
            .columns()
            .filter(|c| *c != primary_key && Some(*c) != generated_created_at)
            .collect();

        self.fetch_returning(&build_upsert::<S>(&values, &update_columns))
            .await?
            .ok_or(ModelError::Store(sqlx::Error::RowNotFound))
    }
}
