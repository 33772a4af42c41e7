//! Backend-neutral column values and rows
//!
//! `SqlValue` mirrors the five storage classes every supported dialect can
//! represent. Records encode into a `Row` of named values and decode back out
//! of one; the backend only ever sees these two types.

use crate::errors::{schema_error, Result};
use serde::Serialize;

/// A single column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Storage class name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Integer(_) => "INTEGER",
            SqlValue::Real(_) => "REAL",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Blob(_) => "BLOB",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{:?}", v),
            SqlValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            SqlValue::Blob(v) => {
                write!(f, "X'")?;
                for b in v {
                    write!(f, "{:02X}", b)?;
                }
                write!(f, "'")
            }
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// An ordered set of named column values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing an existing one with the same name
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Builder form of [`Row::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column value, or a schema error naming the missing column
    pub fn require(&self, column: &str) -> Result<&SqlValue> {
        self.get(column)
            .ok_or_else(|| schema_error(column, "column missing from row"))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keep only the named columns, in the order given
    pub fn project(&self, columns: &[&str]) -> Result<Row> {
        let mut out = Row::new();
        for column in columns {
            out.set(*column, self.require(column)?.clone());
        }
        Ok(out)
    }

    pub fn integer(&self, column: &str) -> Result<i64> {
        match self.require(column)? {
            SqlValue::Integer(v) => Ok(*v),
            other => Err(wrong_class(column, "INTEGER", other)),
        }
    }

    pub fn opt_integer(&self, column: &str) -> Result<Option<i64>> {
        match self.require(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v)),
            other => Err(wrong_class(column, "INTEGER", other)),
        }
    }

    /// REAL column; integral values stored by an INTEGER-affinity column are accepted
    pub fn real(&self, column: &str) -> Result<f64> {
        match self.require(column)? {
            SqlValue::Real(v) => Ok(*v),
            SqlValue::Integer(v) => Ok(*v as f64),
            other => Err(wrong_class(column, "REAL", other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<&str> {
        match self.require(column)? {
            SqlValue::Text(v) => Ok(v.as_str()),
            other => Err(wrong_class(column, "TEXT", other)),
        }
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<&str>> {
        match self.require(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.as_str())),
            other => Err(wrong_class(column, "TEXT", other)),
        }
    }

    pub fn blob(&self, column: &str) -> Result<&[u8]> {
        match self.require(column)? {
            SqlValue::Blob(v) => Ok(v.as_slice()),
            other => Err(wrong_class(column, "BLOB", other)),
        }
    }
}

fn wrong_class(column: &str, expected: &str, actual: &SqlValue) -> crate::errors::ExError {
    let found = actual.type_name();
    schema_error(
        column,
        format!("expected {} storage, found {}", expected, found),
    )
    .with_expected(expected)
    .with_actual(actual.to_string())
}
