//! Bound parameter values and the row write shape

use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

use super::schema::Column;

/// Represents a SQL value that can be bound to a query.
///
/// Used by filters and writes to collect values for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl SqlValue {
    /// Bind this value to a sqlx query builder
    pub fn bind_to_query<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Bool(b) => query.bind(if *b { 1i64 } else { 0i64 }),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        SqlValue::Text(value.to_string())
    }
}

/// Column/value pairs for an insert or update, in the order they were set.
///
/// Setting the same column twice keeps the position of the first `set` and the
/// value of the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Values<C> {
    entries: Vec<(C, SqlValue)>,
}

impl<C: Column> Values<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set a column (builder style)
    pub fn set(mut self, column: C, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column only when a value is given; `None` leaves the column untouched
    pub fn set_opt<V: Into<SqlValue>>(self, column: C, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn insert(&mut self, column: C, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Insert only if the column has no value yet or holds `Null`
    pub fn insert_default(&mut self, column: C, value: impl Into<SqlValue>) {
        if self.get(column).is_none_or(SqlValue::is_null) {
            self.insert(column, value);
        }
    }

    pub fn remove(&mut self, column: C) -> Option<SqlValue> {
        let index = self.entries.iter().position(|(c, _)| *c == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, column: C) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: C) -> bool {
        self.entries.iter().any(|(c, _)| *c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(C, SqlValue)> {
        self.entries.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = C> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }
}

impl<C: Column> Default for Values<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Column> FromIterator<(C, SqlValue)> for Values<C> {
    fn from_iter<I: IntoIterator<Item = (C, SqlValue)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (column, value) in iter {
            values.insert(column, value);
        }
        values
    }
}

impl<C: Column> IntoIterator for Values<C> {
    type Item = (C, SqlValue);
    type IntoIter = std::vec::IntoIter<(C, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::schema::fixtures::ArticleColumn;

    #[test]
    fn test_set_replaces_in_place() {
        let values = Values::new()
            .set(ArticleColumn::Title, "first")
            .set(ArticleColumn::Status, "draft")
            .set(ArticleColumn::Title, "second");
        let columns: Vec<_> = values.columns().collect();
        assert_eq!(columns, vec![ArticleColumn::Title, ArticleColumn::Status]);
        assert_eq!(
            values.get(ArticleColumn::Title),
            Some(&SqlValue::Text("second".to_string()))
        );
    }

    #[test]
    fn test_insert_default_keeps_caller_value() {
        let mut values = Values::new().set(ArticleColumn::Id, "given");
        values.insert_default(ArticleColumn::Id, "generated");
        values.insert_default(ArticleColumn::Status, "draft");
        assert_eq!(values.get(ArticleColumn::Id), Some(&SqlValue::from("given")));
        assert_eq!(values.get(ArticleColumn::Status), Some(&SqlValue::from("draft")));
    }

    #[test]
    fn test_insert_default_replaces_null() {
        let mut values = Values::new().set(ArticleColumn::CreatedAt, SqlValue::Null);
        values.insert_default(ArticleColumn::CreatedAt, "2024-01-01T00:00:00.000000Z");
        assert_eq!(
            values.get(ArticleColumn::CreatedAt),
            Some(&SqlValue::from("2024-01-01T00:00:00.000000Z"))
        );
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(0i64)), SqlValue::Int(0));
        assert!(!SqlValue::from(false).is_null());
    }

    #[test]
    fn test_set_opt() {
        let values = Values::new()
            .set_opt(ArticleColumn::Title, None::<String>)
            .set_opt(ArticleColumn::MenuOrder, Some(0));
        assert!(!values.contains(ArticleColumn::Title));
        assert_eq!(values.get(ArticleColumn::MenuOrder), Some(&SqlValue::Int(0)));
    }
}
