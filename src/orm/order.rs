//! Order compiler

use super::error::ModelResult;
use super::filter::ColumnRef;
use super::schema::{Column, Schema, quote_ident};

/// Order direction for sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9, oldest-newest)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest-oldest)
    Desc,
}

impl SortDirection {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// How a list query should be ordered.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderSpec<C> {
    Column(ColumnRef<C>, SortDirection),
    /// Verbatim ORDER BY body, e.g. `"menu_order ASC, title ASC"`. Not validated.
    Raw(String),
}

impl<C: Column> OrderSpec<C> {
    pub fn asc(column: C) -> Self {
        OrderSpec::Column(ColumnRef::Typed(column), SortDirection::Asc)
    }

    pub fn desc(column: C) -> Self {
        OrderSpec::Column(ColumnRef::Typed(column), SortDirection::Desc)
    }

    /// Order by a column given by name; resolved when compiled
    pub fn named(column: impl Into<String>, direction: SortDirection) -> Self {
        OrderSpec::Column(ColumnRef::Named(column.into()), direction)
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        OrderSpec::Raw(sql.into())
    }
}

/// One compiled ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortInstruction {
    Column {
        name: &'static str,
        direction: SortDirection,
    },
    Raw(String),
}

impl SortInstruction {
    pub fn to_sql(&self) -> String {
        match self {
            SortInstruction::Column { name, direction } => {
                format!("{} {}", quote_ident(name), direction.to_sql())
            }
            SortInstruction::Raw(sql) => sql.clone(),
        }
    }
}

/// Compile an optional order spec for schema `S`.
///
/// No spec means newest first when the schema has a creation timestamp, otherwise
/// no ordering at all.
pub fn compile_order<S: Schema>(order: Option<&OrderSpec<S::Column>>) -> ModelResult<Vec<SortInstruction>> {
    match order {
        None => Ok(S::Column::created_at()
            .map(|column| SortInstruction::Column {
                name: column.name(),
                direction: SortDirection::Desc,
            })
            .into_iter()
            .collect()),
        Some(OrderSpec::Raw(sql)) => Ok(vec![SortInstruction::Raw(sql.clone())]),
        Some(OrderSpec::Column(column, direction)) => {
            let column = column.resolve(S::TABLE_NAME)?;
            Ok(vec![SortInstruction::Column {
                name: column.name(),
                direction: *direction,
            }])
        }
    }
}

/// Render compiled instructions as an ORDER BY body; `None` when unordered.
pub fn order_by_sql(instructions: &[SortInstruction]) -> Option<String> {
    if instructions.is_empty() {
        return None;
    }
    Some(
        instructions
            .iter()
            .map(SortInstruction::to_sql)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::error::ModelError;
    use crate::orm::schema::fixtures::{ArticleColumn, Articles, Tags};
    use assert_matches::assert_matches;

    #[test]
    fn test_default_is_newest_first() {
        let instructions = compile_order::<Articles>(None).unwrap();
        assert_eq!(
            instructions,
            vec![SortInstruction::Column {
                name: "created_at",
                direction: SortDirection::Desc
            }]
        );
        assert_eq!(
            order_by_sql(&instructions).as_deref(),
            Some("\"created_at\" DESC")
        );
    }

    #[test]
    fn test_default_without_created_at_is_unordered() {
        let instructions = compile_order::<Tags>(None).unwrap();
        assert!(instructions.is_empty());
        assert_eq!(order_by_sql(&instructions), None);
    }

    #[test]
    fn test_column_order() {
        let spec = OrderSpec::asc(ArticleColumn::MenuOrder);
        let instructions = compile_order::<Articles>(Some(&spec)).unwrap();
        assert_eq!(
            order_by_sql(&instructions).as_deref(),
            Some("\"menu_order\" ASC")
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let spec = OrderSpec::<ArticleColumn>::raw("menu_order ASC, title DESC");
        let instructions = compile_order::<Articles>(Some(&spec)).unwrap();
        assert_eq!(
            instructions,
            vec![SortInstruction::Raw("menu_order ASC, title DESC".to_string())]
        );
    }

    #[test]
    fn test_unknown_named_column() {
        let spec = OrderSpec::<ArticleColumn>::named("menuOrder", SortDirection::Asc);
        assert_matches!(
            compile_order::<Articles>(Some(&spec)),
            Err(ModelError::ColumnNotFound { table: "articles", .. })
        );
    }

    #[test]
    fn test_named_column_resolves() {
        let spec = OrderSpec::<ArticleColumn>::named("title", SortDirection::Desc);
        let instructions = compile_order::<Articles>(Some(&spec)).unwrap();
        assert_eq!(order_by_sql(&instructions).as_deref(), Some("\"title\" DESC"));
    }
}
