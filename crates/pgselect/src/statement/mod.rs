//! SELECT statement builder.
//!
//! The builder accumulates columns, a source table, one filter condition,
//! orderings, pagination and named parameters, then renders them into a
//! single statement:
//!
//! ```text
//! SELECT <cols> FROM <table>[ <alias>] [WHERE <cond>] [ORDER BY ..] [LIMIT n] [OFFSET n]
//! ```
//!
//! Nothing is escaped or quoted. Values belong in named parameters (`:name`)
//! bound through [`StatementBuilder::set_param`]; table, column and condition
//! strings are trusted as given.

mod fields;


pub use fields::Fields;

use crate::error::{SelectError, SelectResult};
use crate::executor::Executor;
use crate::param::Params;
use crate::value::Value;
use std::fmt;

/// Sort direction accepted by [`StatementBuilder::order_by`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parse an exact, case-sensitive `"ASC"` / `"DESC"` token.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ASC" => Some(Direction::Asc),
            "DESC" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fluent SELECT builder.
///
/// # Example
///
/// ```ignore
/// use pgselect::StatementBuilder;
///
/// let sql = StatementBuilder::new()
///     .select(["id", "name"])
///     .from_as("users", "u")
///     .where_("u.age > :age")
///     .set_param("age", 18)
///     .order_by("name", "ASC")
///     .limit(10)
///     .page(2)
///     .render()?;
///
/// assert_eq!(
///     sql,
///     "SELECT id, name FROM users u WHERE u.age > :age ORDER BY name ASC LIMIT 10 OFFSET 10"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct StatementBuilder {
    /// SELECT columns (default ["*"])
    columns: Vec<String>,
    /// Whether `columns` still holds the default `*`
    default_columns: bool,
    /// Rendered `FROM` fragment
    source: Option<String>,
    /// Rendered `WHERE` fragment
    filter: Option<String>,
    params: Params,
    /// ORDER BY items
    orderings: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementBuilder {
    /// Create an empty builder selecting `*`.
    pub fn new() -> Self {
        Self {
            columns: vec!["*".to_string()],
            default_columns: true,
            source: None,
            filter: None,
            params: Params::new(),
            orderings: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== SELECT columns ====================

    /// Add SELECT columns.
    ///
    /// Nested input is flattened in order. The first non-empty call replaces
    /// the default `*`; later calls append.
    pub fn select(mut self, fields: impl Into<Fields>) -> Self {
        let flat = fields.into().flatten();
        if flat.is_empty() {
            return self;
        }
        if self.default_columns {
            self.columns.clear();
            self.default_columns = false;
        }
        self.columns.extend(flat);
        self
    }

    // ==================== FROM ====================

    /// Set the source table, replacing any previous one.
    pub fn from(mut self, table: &str) -> Self {
        self.source = Some(format!("FROM {table}"));
        self
    }

    /// Set the source table with an alias. An empty alias is ignored.
    pub fn from_as(mut self, table: &str, alias: &str) -> Self {
        self.source = Some(if alias.is_empty() {
            format!("FROM {table}")
        } else {
            format!("FROM {table} {alias}")
        });
        self
    }

    // ==================== WHERE ====================

    /// Set the WHERE condition, replacing any previous one.
    ///
    /// Reference values with `:name` placeholders and bind them via
    /// [`set_param`](Self::set_param).
    pub fn where_(mut self, condition: &str) -> Self {
        self.filter = Some(format!("WHERE {condition}"));
        self
    }

    /// Bind (or rebind) a named parameter.
    pub fn set_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    // ==================== ORDER BY ====================

    /// Add an ORDER BY item.
    ///
    /// `direction` must be exactly `"ASC"` or `"DESC"`; any other token is
    /// dropped and the key is ordered by the database default.
    pub fn order_by(mut self, key: &str, direction: &str) -> Self {
        match Direction::parse(direction) {
            Some(dir) => self.orderings.push(format!("{key} {dir}")),
            None => self.orderings.push(key.to_string()),
        }
        self
    }

    /// Add an ORDER BY item with a typed direction.
    pub fn order_by_dir(self, key: &str, direction: Direction) -> Self {
        self.order_by(key, direction.as_str())
    }

    // ==================== Pagination ====================

    /// Set LIMIT. `0` renders no LIMIT clause.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET. `0` still renders `OFFSET 0`.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Jump to a 1-based page of `limit` rows.
    ///
    /// Does nothing until a limit has been set. Pages below 1 are not clamped
    /// and produce a negative offset.
    pub fn page(self, page: i64) -> Self {
        match self.limit {
            Some(limit) => {
                let offset = page.saturating_sub(1).saturating_mul(limit);
                self.offset(offset)
            }
            None => self,
        }
    }

    // ==================== Accessors ====================

    /// Current SELECT columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Bound parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    // ==================== Render ====================

    /// Validate builder state before rendering.
    pub fn validate(&self) -> SelectResult<()> {
        if self.source.is_none() {
            return Err(SelectError::MissingSource);
        }
        Ok(())
    }

    /// Render the statement.
    ///
    /// Fails with [`SelectError::MissingSource`] if no table was set.
    pub fn render(&self) -> SelectResult<String> {
        let Some(source) = &self.source else {
            return Err(SelectError::MissingSource);
        };

        let mut sql = format!("SELECT {} {}", self.columns.join(", "), source);

        if let Some(filter) = &self.filter {
            sql.push(' ');
            sql.push_str(filter);
        }

        if !self.orderings.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orderings.join(", "));
        }

        // LIMIT 0 is treated as "no limit"; OFFSET 0 is rendered.
        if let Some(limit) = self.limit.filter(|&l| l != 0) {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(sql)
    }

    // ==================== Execution ====================

    /// Run the statement and read one field from the first row.
    ///
    /// Returns `Ok(None)` when there are no rows or the field is `NULL`.
    /// A row without `field` is a [`SelectError::Decode`].
    pub async fn fetch_scalar(
        &self,
        exec: &impl Executor,
        field: &str,
    ) -> SelectResult<Option<String>> {
        let sql = self.render()?;
        tracing::debug!(target: "pgselect.sql", sql = %sql, param_count = self.params.len(), field, "fetch_scalar");

        let Some(row) = exec.fetch_opt(&sql, &self.params).await? else {
            return Ok(None);
        };
        match row.get(field) {
            Some(value) => Ok(value.to_text()),
            None => Err(SelectError::decode(field, "column not present in result row")),
        }
    }

    /// Run the statement and count the rows it returns.
    ///
    /// All rows are fetched; the statement is not rewritten to `COUNT(*)`.
    pub async fn count_rows(&self, exec: &impl Executor) -> SelectResult<u64> {
        let sql = self.render()?;
        tracing::debug!(target: "pgselect.sql", sql = %sql, param_count = self.params.len(), "count_rows");

        let rows = exec.fetch_all(&sql, &self.params).await?;
        Ok(rows.len() as u64)
    }
}
