//! SQL query builder for schemas
//!
//! Builds parameterized SQL for every statement the façade issues. All values go
//! through `?` placeholders; only identifiers from column definitions and raw
//! filter/order expressions are spliced into the SQL text.

use std::marker::PhantomData;

use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use super::error::ModelResult;
use super::filter::{Filter, Predicate, compile_filters};
use super::order::{OrderSpec, SortInstruction, compile_order, order_by_sql};
use super::schema::{Column, Schema, quote_ident};
use super::value::{SqlValue, Values};

/// SQL text plus positional parameters, ready for a [`Store`](super::Store).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Build the sqlx query with every parameter bound in order
    pub fn as_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.params {
            query = value.bind_to_query(query);
        }
        query
    }
}

fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn and_predicates(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
    match (left, right) {
        (None, p) | (p, None) => p,
        (Some(mut l), Some(r)) => {
            l.sql = format!("{} AND {}", l.sql, r.sql);
            l.params.extend(r.params);
            Some(l)
        }
    }
}

/// A SELECT/COUNT/DELETE builder for one schema.
pub struct EntityQuery<S: Schema> {
    predicate: Option<Predicate>,
    order: Vec<SortInstruction>,
    limit: Option<u64>,
    offset: Option<u64>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> EntityQuery<S> {
    /// Create a new query builder for the schema.
    pub fn new() -> Self {
        Self {
            predicate: None,
            order: Vec::new(),
            limit: None,
            offset: None,
            _schema: PhantomData,
        }
    }

    /// AND a compiled filter list onto the query.
    pub fn filter(mut self, filters: &[Filter<S::Column>]) -> ModelResult<Self> {
        let compiled = compile_filters::<S>(filters)?;
        self.predicate = and_predicates(self.predicate.take(), compiled);
        Ok(self)
    }

    /// Replace the ordering; `None` applies the schema default.
    pub fn order_by(mut self, order: Option<&OrderSpec<S::Column>>) -> ModelResult<Self> {
        self.order = compile_order::<S>(order)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.sql);
            params.extend(predicate.params.iter().cloned());
        }
    }

    /// Build the SELECT statement.
    pub fn build_select(&self) -> CompiledQuery {
        let mut sql = format!(
            "SELECT {} FROM {}",
            S::select_list(),
            quote_ident(S::TABLE_NAME)
        );
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params);

        if let Some(order) = order_by_sql(&self.order) {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ?");
                params.push(SqlValue::Int(clamp(limit)));
                if let Some(offset) = offset.filter(|o| *o > 0) {
                    sql.push_str(" OFFSET ?");
                    params.push(SqlValue::Int(clamp(offset)));
                }
            }
            (None, Some(offset)) if offset > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(SqlValue::Int(clamp(offset)));
            }
            (None, _) => {}
        }

        CompiledQuery { sql, params }
    }

    /// Build a COUNT statement; ordering and pagination are ignored.
    pub fn build_count(&self) -> CompiledQuery {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(S::TABLE_NAME));
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params);
        CompiledQuery { sql, params }
    }

    /// Build a DELETE statement for the filtered rows.
    pub fn build_delete(&self) -> CompiledQuery {
        let mut sql = format!("DELETE FROM {}", quote_ident(S::TABLE_NAME));
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params);
        CompiledQuery { sql, params }
    }
}

impl<S: Schema> Default for EntityQuery<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn column_list<C: Column>(columns: impl Iterator<Item = C>) -> String {
    columns
        .map(|c| quote_ident(c.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT … RETURNING` for one row.
pub fn build_insert<S: Schema>(values: &Values<S::Column>) -> CompiledQuery {
    let placeholders = vec!["?"; values.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_ident(S::TABLE_NAME),
        column_list(values.columns()),
        placeholders,
        S::select_list()
    );
    CompiledQuery {
        sql,
        params: values.iter().map(|(_, v)| v.clone()).collect(),
    }
}

/// `UPDATE … WHERE pk = ? RETURNING`. `values` must not be empty.
pub fn build_update<S: Schema>(id: &str, values: &Values<S::Column>) -> CompiledQuery {
    build_update_filling::<S>(id, values, &Values::new())
}

/// Like [`build_update`], but every column in `fill` is written as
/// `COALESCE(col, ?)`, keeping a value the row already has.
pub fn build_update_filling<S: Schema>(
    id: &str,
    values: &Values<S::Column>,
    fill: &Values<S::Column>,
) -> CompiledQuery {
    let assignments = values
        .columns()
        .map(|c| format!("{} = ?", quote_ident(c.name())))
        .chain(fill.columns().map(|c| {
            let name = quote_ident(c.name());
            format!("{name} = COALESCE({name}, ?)")
        }))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ? RETURNING {}",
        quote_ident(S::TABLE_NAME),
        assignments,
        quote_ident(S::Column::primary_key().name()),
        S::select_list()
    );
    let mut params: Vec<SqlValue> = values
        .iter()
        .chain(fill.iter())
        .map(|(_, v)| v.clone())
        .collect();
    params.push(SqlValue::from(id));
    CompiledQuery { sql, params }
}

/// `INSERT … ON CONFLICT (pk) DO UPDATE SET … RETURNING`.
///
/// `update_columns` lists what a conflict overwrites; when empty the primary key is
/// assigned to itself so that `RETURNING` still yields the existing row.
pub fn build_upsert<S: Schema>(values: &Values<S::Column>, update_columns: &[S::Column]) -> CompiledQuery {
    let primary_key = quote_ident(S::Column::primary_key().name());
    let assignments = if update_columns.is_empty() {
        format!("{primary_key} = excluded.{primary_key}")
    } else {
        update_columns
            .iter()
            .map(|c| {
                let name = quote_ident(c.name());
                format!("{name} = excluded.{name}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let placeholders = vec!["?"; values.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING {}",
        quote_ident(S::TABLE_NAME),
        column_list(values.columns()),
        placeholders,
        primary_key,
        assignments,
        S::select_list()
    );
    CompiledQuery {
        sql,
        params: values.iter().map(|(_, v)| v.clone()).collect(),
    }
}

/// `DELETE … WHERE pk = ?`
pub fn build_delete_by_id<S: Schema>(id: &str) -> CompiledQuery {
    CompiledQuery {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(S::TABLE_NAME),
            quote_ident(S::Column::primary_key().name())
        ),
        params: vec![SqlValue::from(id)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::schema::fixtures::{ArticleColumn, Articles, TagColumn, Tags};
    use pretty_assertions::assert_eq;

    const ARTICLE_COLUMNS: &str =
        "\"id\", \"title\", \"status\", \"menu_order\", \"sticky\", \"created_at\", \"updated_at\"";

    #[test]
    fn test_select_with_everything() {
        let query = EntityQuery::<Articles>::new()
            .filter(&[Filter::eq(ArticleColumn::Status, "publish")])
            .unwrap()
            .order_by(Some(&OrderSpec::asc(ArticleColumn::MenuOrder)))
            .unwrap()
            .limit(10)
            .offset(20)
            .build_select();
        assert_eq!(
            query.sql,
            format!(
                "SELECT {ARTICLE_COLUMNS} FROM \"articles\" WHERE \"status\" = ? ORDER BY \"menu_order\" ASC LIMIT ? OFFSET ?"
            )
        );
        assert_eq!(
            query.params,
            vec![SqlValue::from("publish"), SqlValue::Int(10), SqlValue::Int(20)]
        );
    }

    #[test]
    fn test_filters_accumulate_with_and() {
        let query = EntityQuery::<Articles>::new()
            .filter(&[Filter::eq(ArticleColumn::Status, "draft")])
            .unwrap()
            .filter(&[Filter::gt(ArticleColumn::MenuOrder, 0)])
            .unwrap()
            .build_count();
        assert_eq!(
            query.sql,
            "SELECT COUNT(*) FROM \"articles\" WHERE \"status\" = ? AND \"menu_order\" > ?"
        );
        assert_eq!(query.params, vec![SqlValue::from("draft"), SqlValue::Int(0)]);
    }

    #[test]
    fn test_zero_offset_is_omitted() {
        let query = EntityQuery::<Tags>::new().limit(5).offset(0).build_select();
        assert_eq!(query.sql, "SELECT \"id\", \"label\" FROM \"tags\" LIMIT ?");
        assert_eq!(query.params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_offset_without_limit() {
        let query = EntityQuery::<Tags>::new().offset(3).build_select();
        assert_eq!(
            query.sql,
            "SELECT \"id\", \"label\" FROM \"tags\" LIMIT -1 OFFSET ?"
        );
    }

    #[test]
    fn test_huge_limit_is_clamped() {
        let query = EntityQuery::<Tags>::new().limit(u64::MAX).build_select();
        assert_eq!(query.params, vec![SqlValue::Int(i64::MAX)]);
    }

    #[test]
    fn test_delete_where() {
        let query = EntityQuery::<Tags>::new()
            .filter(&[Filter::eq(TagColumn::Label, "old")])
            .unwrap()
            .build_delete();
        assert_eq!(query.sql, "DELETE FROM \"tags\" WHERE \"label\" = ?");
    }

    #[test]
    fn test_insert() {
        let values = Values::new()
            .set(TagColumn::Id, "t1")
            .set(TagColumn::Label, "rust");
        let query = build_insert::<Tags>(&values);
        assert_eq!(
            query.sql,
            "INSERT INTO \"tags\" (\"id\", \"label\") VALUES (?, ?) RETURNING \"id\", \"label\""
        );
        assert_eq!(query.params, vec![SqlValue::from("t1"), SqlValue::from("rust")]);
    }

    #[test]
    fn test_update() {
        let values = Values::new()
            .set(ArticleColumn::Title, "New")
            .set(ArticleColumn::UpdatedAt, "2024-01-01T00:00:00.000000Z");
        let query = build_update::<Articles>("a1", &values);
        assert_eq!(
            query.sql,
            format!(
                "UPDATE \"articles\" SET \"title\" = ?, \"updated_at\" = ? WHERE \"id\" = ? RETURNING {ARTICLE_COLUMNS}"
            )
        );
        assert_eq!(query.params.last(), Some(&SqlValue::from("a1")));
    }

    #[test]
    fn test_update_filling_keeps_existing_values() {
        let values = Values::new().set(ArticleColumn::Status, "publish");
        let fill = Values::new().set(ArticleColumn::Title, "Untitled");
        let query = build_update_filling::<Articles>("a1", &values, &fill);
        assert_eq!(
            query.sql,
            format!(
                "UPDATE \"articles\" SET \"status\" = ?, \"title\" = COALESCE(\"title\", ?) WHERE \"id\" = ? RETURNING {ARTICLE_COLUMNS}"
            )
        );
        assert_eq!(
            query.params,
            vec![
                SqlValue::from("publish"),
                SqlValue::from("Untitled"),
                SqlValue::from("a1")
            ]
        );
    }

    #[test]
    fn test_upsert() {
        let values = Values::new()
            .set(TagColumn::Id, "t1")
            .set(TagColumn::Label, "rust");
        let query = build_upsert::<Tags>(&values, &[TagColumn::Label]);
        assert_eq!(
            query.sql,
            "INSERT INTO \"tags\" (\"id\", \"label\") VALUES (?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"label\" = excluded.\"label\" RETURNING \"id\", \"label\""
        );
    }

    #[test]
    fn test_upsert_with_nothing_to_update() {
        let values = Values::new().set(TagColumn::Id, "t1");
        let query = build_upsert::<Tags>(&values, &[]);
        assert!(query.sql.contains("DO UPDATE SET \"id\" = excluded.\"id\""));
    }

    #[test]
    fn test_delete_by_id() {
        let query = build_delete_by_id::<Tags>("t1");
        assert_eq!(query.sql, "DELETE FROM \"tags\" WHERE \"id\" = ?");
        assert_eq!(query.params, vec![SqlValue::from("t1")]);
    }
}
