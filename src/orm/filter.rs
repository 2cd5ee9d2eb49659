//! Filter compiler
//!
//! Turns a list of structured filters into one parameterized SQL predicate:
//! - Equals, NotEquals
//! - GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual
//! - Like (case-sensitive), CaseInsensitiveLike
//! - In, NotIn (list membership)
//!
//! Filters in one list are always ANDed. Anything else (OR, sub-selects) goes
//! through [`Filter::Raw`].

use super::error::{ModelError, ModelResult};
use super::schema::{Column, Schema, quote_ident};
use super::value::SqlValue;

/// A column named either by its typed enum value or by its database name.
///
/// Typed references cannot fail to resolve. Named references exist for callers that
/// receive column names as strings (query parameters, stored views).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef<C> {
    Typed(C),
    Named(String),
}

impl<C: Column> ColumnRef<C> {
    /// Resolve against the schema owning `C`
    pub fn resolve(&self, table: &'static str) -> ModelResult<C> {
        match self {
            ColumnRef::Typed(column) => Ok(*column),
            ColumnRef::Named(name) => C::from_name(name).ok_or_else(|| ModelError::ColumnNotFound {
                table,
                column: name.clone(),
            }),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ColumnRef::Typed(column) => column.name().to_string(),
            ColumnRef::Named(name) => name.clone(),
        }
    }
}

impl<C: Column> From<C> for ColumnRef<C> {
    fn from(column: C) -> Self {
        ColumnRef::Typed(column)
    }
}

/// One comparison, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Equals(SqlValue),
    NotEquals(SqlValue),
    GreaterThan(SqlValue),
    GreaterThanOrEqual(SqlValue),
    LessThan(SqlValue),
    LessThanOrEqual(SqlValue),
    Like(String),
    CaseInsensitiveLike(String),
    In(Vec<SqlValue>),
    NotIn(Vec<SqlValue>),
}

/// Operator slots of a property filter.
///
/// A slot counts as given when it is `Some`, whatever the value inside: `Some(0)`,
/// `Some("")`, `Some(false)` and `Some(Null)` are all honored. When several slots are
/// set, the first one in field order wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSlots {
    pub equals: Option<SqlValue>,
    pub not_equals: Option<SqlValue>,
    pub greater_than: Option<SqlValue>,
    pub greater_than_or_equal: Option<SqlValue>,
    pub less_than: Option<SqlValue>,
    pub less_than_or_equal: Option<SqlValue>,
    /// Case-sensitive pattern, `%` and `_` wildcards
    pub like: Option<String>,
    /// Case-insensitive pattern, `%` and `_` wildcards
    pub case_insensitive_like: Option<String>,
    pub in_list: Option<Vec<SqlValue>>,
    pub not_in: Option<Vec<SqlValue>>,
}

impl OperatorSlots {
    /// Pick the first present slot
    pub fn resolve(&self) -> Option<Operator> {
        if let Some(v) = &self.equals {
            return Some(Operator::Equals(v.clone()));
        }
        if let Some(v) = &self.not_equals {
            return Some(Operator::NotEquals(v.clone()));
        }
        if let Some(v) = &self.greater_than {
            return Some(Operator::GreaterThan(v.clone()));
        }
        if let Some(v) = &self.greater_than_or_equal {
            return Some(Operator::GreaterThanOrEqual(v.clone()));
        }
        if let Some(v) = &self.less_than {
            return Some(Operator::LessThan(v.clone()));
        }
        if let Some(v) = &self.less_than_or_equal {
            return Some(Operator::LessThanOrEqual(v.clone()));
        }
        if let Some(p) = &self.like {
            return Some(Operator::Like(p.clone()));
        }
        if let Some(p) = &self.case_insensitive_like {
            return Some(Operator::CaseInsensitiveLike(p.clone()));
        }
        if let Some(list) = &self.in_list {
            return Some(Operator::In(list.clone()));
        }
        if let Some(list) = &self.not_in {
            return Some(Operator::NotIn(list.clone()));
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.resolve().is_none()
    }
}

/// A comparison against one column.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter<C> {
    pub column: ColumnRef<C>,
    pub ops: OperatorSlots,
}

impl<C: Column> PropertyFilter<C> {
    pub fn new(column: C) -> Self {
        Self {
            column: ColumnRef::Typed(column),
            ops: OperatorSlots::default(),
        }
    }

    /// Filter on a column given by name; resolved when the filter is compiled
    pub fn named(column: impl Into<String>) -> Self {
        Self {
            column: ColumnRef::Named(column.into()),
            ops: OperatorSlots::default(),
        }
    }

    pub fn equals(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.equals = Some(value.into());
        self
    }

    pub fn not_equals(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.not_equals = Some(value.into());
        self
    }

    pub fn greater_than(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.greater_than = Some(value.into());
        self
    }

    pub fn greater_than_or_equal(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.greater_than_or_equal = Some(value.into());
        self
    }

    pub fn less_than(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.less_than = Some(value.into());
        self
    }

    pub fn less_than_or_equal(mut self, value: impl Into<SqlValue>) -> Self {
        self.ops.less_than_or_equal = Some(value.into());
        self
    }

    pub fn like(mut self, pattern: impl Into<String>) -> Self {
        self.ops.like = Some(pattern.into());
        self
    }

    pub fn case_insensitive_like(mut self, pattern: impl Into<String>) -> Self {
        self.ops.case_insensitive_like = Some(pattern.into());
        self
    }

    pub fn in_list<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.ops.in_list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_in<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.ops.not_in = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A pre-built boolean SQL expression with `?` placeholders. Not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl RawExpr {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// One entry of a filter list.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<C> {
    Property(PropertyFilter<C>),
    Raw(RawExpr),
}

impl<C: Column> Filter<C> {
    pub fn eq(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).equals(value).into()
    }

    pub fn ne(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).not_equals(value).into()
    }

    pub fn gt(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).greater_than(value).into()
    }

    pub fn gte(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).greater_than_or_equal(value).into()
    }

    pub fn lt(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).less_than(value).into()
    }

    pub fn lte(column: C, value: impl Into<SqlValue>) -> Self {
        PropertyFilter::new(column).less_than_or_equal(value).into()
    }

    pub fn like(column: C, pattern: impl Into<String>) -> Self {
        PropertyFilter::new(column).like(pattern).into()
    }

    pub fn ilike(column: C, pattern: impl Into<String>) -> Self {
        PropertyFilter::new(column).case_insensitive_like(pattern).into()
    }

    pub fn is_in<I, V>(column: C, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        PropertyFilter::new(column).in_list(values).into()
    }

    pub fn not_in<I, V>(column: C, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        PropertyFilter::new(column).not_in(values).into()
    }

    pub fn raw(expr: RawExpr) -> Self {
        Filter::Raw(expr)
    }
}

impl<C> From<PropertyFilter<C>> for Filter<C> {
    fn from(filter: PropertyFilter<C>) -> Self {
        Filter::Property(filter)
    }
}

impl<C> From<RawExpr> for Filter<C> {
    fn from(expr: RawExpr) -> Self {
        Filter::Raw(expr)
    }
}

/// Compiled WHERE clause body with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Compile a filter list against schema `S`.
///
/// Returns `None` for an empty list (no restriction).
pub fn compile_filters<S: Schema>(filters: &[Filter<S::Column>]) -> ModelResult<Option<Predicate>> {
    if filters.is_empty() {
        return Ok(None);
    }

    let mut clauses = Vec::with_capacity(filters.len());
    let mut params = Vec::new();

    for filter in filters {
        match filter {
            Filter::Property(property) => {
                let column = property.column.resolve(S::TABLE_NAME)?;
                let operator = property.ops.resolve().ok_or_else(|| ModelError::OperatorMissing {
                    column: property.column.display_name(),
                })?;
                clauses.push(compile_operator(&quote_ident(column.name()), operator, &mut params));
            }
            Filter::Raw(raw) => {
                clauses.push(format!("({})", raw.sql));
                params.extend(raw.params.iter().cloned());
            }
        }
    }

    Ok(Some(Predicate {
        sql: clauses.join(" AND "),
        params,
    }))
}

fn compile_operator(column: &str, operator: Operator, params: &mut Vec<SqlValue>) -> String {
    match operator {
        Operator::Equals(SqlValue::Null) => format!("{column} IS NULL"),
        Operator::NotEquals(SqlValue::Null) => format!("{column} IS NOT NULL"),
        Operator::Equals(v) => comparison(column, "=", v, params),
        Operator::NotEquals(v) => comparison(column, "<>", v, params),
        Operator::GreaterThan(v) => comparison(column, ">", v, params),
        Operator::GreaterThanOrEqual(v) => comparison(column, ">=", v, params),
        Operator::LessThan(v) => comparison(column, "<", v, params),
        Operator::LessThanOrEqual(v) => comparison(column, "<=", v, params),
        Operator::Like(pattern) => {
            params.push(SqlValue::Text(like_to_glob(&pattern)));
            format!("{column} GLOB ?")
        }
        Operator::CaseInsensitiveLike(pattern) => {
            params.push(SqlValue::Text(pattern));
            format!("LOWER({column}) LIKE LOWER(?)")
        }
        Operator::In(values) => membership(column, "IN", values, "0 = 1", params),
        Operator::NotIn(values) => membership(column, "NOT IN", values, "1 = 1", params),
    }
}

fn comparison(column: &str, op: &str, value: SqlValue, params: &mut Vec<SqlValue>) -> String {
    params.push(value);
    format!("{column} {op} ?")
}

fn membership(
    column: &str,
    op: &str,
    values: Vec<SqlValue>,
    when_empty: &str,
    params: &mut Vec<SqlValue>,
) -> String {
    if values.is_empty() {
        return when_empty.to_string();
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    params.extend(values);
    format!("{column} {op} ({placeholders})")
}

/// Translate a LIKE pattern into the equivalent (case-sensitive) GLOB pattern.
pub fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '*' => glob.push_str("[*]"),
            '?' => glob.push_str("[?]"),
            '[' => glob.push_str("[[]"),
            other => glob.push(other),
        }
    }
    glob
}
