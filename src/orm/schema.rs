//! Schema registry: declarative column sets for every entity
//!
//! Each entity declares a closed column enum (usually through `#[derive(Column)]`)
//! and a marker type implementing [`Schema`]. Nothing here touches the database
//! except [`Schema::create_table_sql`], which renders the definitions as DDL.

use std::fmt;

use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    /// Stored as INTEGER 0/1
    Boolean,
    /// RFC 3339 UTC text, see [`crate::db::sqlite_helpers::now_iso8601`]
    Timestamp,
    /// JSON document stored as TEXT
    Json,
}

impl ColumnType {
    /// SQLite storage class used in DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::Timestamp | ColumnType::Json => "TEXT",
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }
}

/// What a column means to the façade beyond its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Data,
    PrimaryKey,
    CreatedAt,
    UpdatedAt,
}

/// Column definition for one entity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    pub column_type: ColumnType,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Default value expression (e.g., "0" or "'draft'")
    pub default: Option<&'static str>,
    pub role: ColumnRole,
}

impl ColumnDef {
    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name), self.column_type.sql_type());

        if self.role == ColumnRole::PrimaryKey {
            sql.push_str(" PRIMARY KEY NOT NULL");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = self.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }

        sql
    }
}

/// A closed set of columns belonging to one schema.
///
/// Implemented by `#[derive(Column)]` from `scriptorium-macros`. A typed column value
/// can only name a column that exists, so typed filters and orders never fail
/// column resolution. [`Column::from_name`] covers string input.
pub trait Column: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every column, in declaration order
    const ALL: &'static [Self];

    fn def(&self) -> ColumnDef;

    /// The single-string primary key column
    fn primary_key() -> Self;

    /// Creation timestamp column, used for default ordering
    fn created_at() -> Option<Self>;

    /// Modification timestamp column, refreshed on every update
    fn updated_at() -> Option<Self>;

    fn name(&self) -> &'static str {
        self.def().name
    }

    /// Resolve a column by its database name
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// Metadata about a database entity (table).
pub trait Schema: Send + Sync + 'static {
    /// The SQL table name (e.g., "posts")
    const TABLE_NAME: &'static str;

    type Column: Column;

    /// Row read shape
    type Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    /// Get all column definitions for this entity's table
    fn columns() -> Vec<ColumnDef> {
        Self::Column::ALL.iter().map(|c| c.def()).collect()
    }

    /// Comma-separated, quoted column list in declaration order
    fn select_list() -> String {
        Self::Column::ALL
            .iter()
            .map(|c| quote_ident(c.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL
    fn create_table_sql() -> String {
        let column_defs: Vec<String> = Self::columns().iter().map(|c| c.to_sql()).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            quote_ident(Self::TABLE_NAME),
            column_defs.join(",\n  ")
        )
    }
}

/// Quote an identifier for SQLite.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(ArticleColumn::from_name("menu_order"), Some(ArticleColumn::MenuOrder));
        assert_eq!(ArticleColumn::from_name("menuOrder"), None);
        assert_eq!(ArticleColumn::from_name(""), None);
    }

    #[test]
    fn test_create_table_sql() {
        let sql = Articles::create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"articles\""));
        assert!(sql.contains("\"id\" TEXT PRIMARY KEY NOT NULL"));
        assert!(sql.contains("\"menu_order\" INTEGER NOT NULL"));
        assert!(sql.contains("\"sticky\" INTEGER NOT NULL"));
    }

    #[test]
    fn test_column_def_default_and_nullable() {
        let def = ColumnDef {
            name: "parent_id",
            column_type: ColumnType::Text,
            nullable: true,
            default: Some("NULL"),
            role: ColumnRole::Data,
        };
        assert_eq!(def.to_sql(), "\"parent_id\" TEXT DEFAULT NULL");
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("order"), "\"order\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_select_list() {
        assert_eq!(Tags::select_list(), "\"id\", \"label\"");
    }
}
