//! Backend boundary
//!
//! A `Backend` stores and retrieves [`Row`]s for a [`TableSchema`]. Typed
//! access on top of it lives in the round-trip checker.

use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::{ambiguous, not_found, Result};
use ormcheck_core::schema::TableSchema;
use ormcheck_core::value::{Row, SqlValue};

/// Row filter for `select_many` / `select_one`
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    /// `column = value`, or `column IS NULL` for a null value
    Eq { column: String, value: SqlValue },
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::All => write!(f, "all rows"),
            Predicate::Eq { column, value } => write!(f, "{} = {}", column, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

pub trait Backend {
    fn dialect(&self) -> Dialect;

    fn create_table(&mut self, schema: &TableSchema) -> Result<()>;

    /// Drop if present; dropping a missing table is not an error
    fn drop_table(&mut self, table: &str) -> Result<()>;

    fn drop_and_create_table(&mut self, schema: &TableSchema) -> Result<()> {
        self.drop_table(&schema.name)?;
        self.create_table(schema)
    }

    /// Insert all rows atomically; returns the number written
    fn insert_batch(&mut self, schema: &TableSchema, rows: &[Row]) -> Result<usize>;

    /// Insert one row; returns the row id, backend-assigned for auto-increment keys
    fn insert(&mut self, schema: &TableSchema, row: &Row) -> Result<i64>;

    /// Replace every non-key column of the row with the same primary key
    fn update_row(&mut self, schema: &TableSchema, row: &Row) -> Result<usize>;

    /// Update only `columns` of the row with the same primary key
    fn update_only(&mut self, schema: &TableSchema, row: &Row, columns: &[&str]) -> Result<usize>;

    fn select_many(
        &mut self,
        schema: &TableSchema,
        predicate: &Predicate,
        order: Option<&Order>,
    ) -> Result<Vec<Row>>;

    /// Exactly one matching row: `NotFound` on none, `AmbiguousResult` on several
    fn select_one(&mut self, schema: &TableSchema, predicate: &Predicate) -> Result<Row> {
        let mut rows = self.select_many(schema, predicate, None)?;
        match rows.len() {
            0 => Err(not_found(&schema.name, predicate).with_op("select_one")),
            1 => Ok(rows.remove(0)),
            n => Err(ambiguous(&schema.name, predicate, n).with_op("select_one")),
        }
    }

    /// Rows matching a raw filter fragment with positional `?` parameters
    fn select_where_sql(
        &mut self,
        schema: &TableSchema,
        filter: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Row>>;

    /// Raw stored values of one column, in storage order
    fn select_column(&mut self, table: &str, column: &str) -> Result<Vec<SqlValue>>;

    /// Text of the most recently executed statement
    fn last_sql(&self) -> Option<&str>;
}
