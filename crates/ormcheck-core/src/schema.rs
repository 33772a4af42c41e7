//! Table schemas and the record ↔ row mapping trait
//!
//! A record type describes its table once through [`Table::schema`] and
//! converts itself to and from a [`Row`]. Length and precision annotations
//! live on the column definitions so both DDL rendering and pre-write
//! validation read them from the same place.

use crate::dialect::Capabilities;
use crate::errors::{schema_error, ExError, ExErrorKind, Result};
use crate::value::{Row, SqlValue};

/// Declared precision and scale of a decimal column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub precision: u8,
    pub scale: u8,
}

/// Semantic column type, mapped to a concrete SQL type per dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal(Option<DecimalSpec>),
    /// Text with an optional declared maximum length in characters
    Text(Option<u32>),
    /// The dialect's largest text type
    MaxText,
    Char,
    Uuid,
    DateTime,
    DateTimeOffset,
    Interval,
    Blob,
    /// Collection or nested record serialized into one text column
    Serialized,
}

impl ColumnType {
    /// Whether a value mismatch in this column indicates numeric precision loss
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Float32 | ColumnType::Float64 | ColumnType::Decimal(_)
        )
    }
}

/// Foreign key target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            references: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Backend-assigned primary key
    pub fn auto_increment(mut self) -> Self {
        self.primary_key = true;
        self.auto_increment = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Composite (or single-column) index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Complete table description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn composite_index(mut self, unique: bool, columns: &[&str]) -> Self {
        self.indexes.push(IndexDef {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        });
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column definition, or a schema error naming the unknown column
    pub fn require_column(&self, name: &str) -> Result<&ColumnDef> {
        self.find_column(name).ok_or_else(|| {
            schema_error(name, "no such column").with_table(self.name.clone())
        })
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Index name in the `uidx_<table>_<cols>` / `idx_<table>_<cols>` form
    pub fn index_name(&self, index: &IndexDef) -> String {
        let prefix = if index.unique { "uidx" } else { "idx" };
        let cols = index
            .columns
            .iter()
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        format!("{}_{}_{}", prefix, self.name.to_lowercase(), cols)
    }

    /// Reject declarations the dialect cannot hold without rounding
    pub fn check_capabilities(&self, caps: &Capabilities) -> Result<()> {
        for column in &self.columns {
            if let ColumnType::Decimal(Some(spec)) = column.ty {
                if spec.precision > caps.max_decimal_precision {
                    return Err(ExError::new(ExErrorKind::PrecisionLoss)
                        .with_table(self.name.clone())
                        .with_field(column.name.clone())
                        .with_expected(format!("precision <= {}", caps.max_decimal_precision))
                        .with_actual(format!("DECIMAL({},{})", spec.precision, spec.scale))
                        .with_message("declared precision exceeds what the backend stores"));
                }
            }
        }
        Ok(())
    }

    /// Check a row against declared lengths, nullability, and what the
    /// target dialect can store, before anything is written
    pub fn validate_row(&self, row: &Row, caps: &Capabilities) -> Result<()> {
        for (name, value) in row.columns() {
            let column = self.require_column(name)?;

            if value.is_null() && !column.nullable && !column.auto_increment {
                return Err(schema_error(name, "NULL written to a NOT NULL column")
                    .with_table(self.name.clone()));
            }

            let SqlValue::Text(text) = value else {
                continue;
            };

            if text.is_empty() && caps.empty_string_is_null && !column.nullable {
                return Err(schema_error(name, "backend reads an empty string back as NULL")
                    .with_table(self.name.clone()));
            }

            if let ColumnType::Text(Some(max)) = column.ty {
                let len = text.chars().count();
                if len > max as usize {
                    return Err(ExError::new(ExErrorKind::InvalidInput)
                        .with_table(self.name.clone())
                        .with_field(name)
                        .with_message(format!(
                            "value of {} characters exceeds declared maximum {}",
                            len, max
                        )));
                }
            }

            if let Some(c) = text.chars().find(|c| !caps.accepts_char(*c)) {
                return Err(schema_error(
                    name,
                    format!("backend cannot store character U+{:04X}", c as u32),
                )
                .with_table(self.name.clone()));
            }
        }
        Ok(())
    }
}

/// Mapping between a record type and its table
pub trait Table: Sized {
    /// Table description used for DDL, validation, and statement building
    fn schema() -> TableSchema;

    /// Encode every column of this record
    fn to_row(&self) -> Result<Row>;

    /// Decode a record from a row containing every column
    fn from_row(row: &Row) -> Result<Self>;

    /// Encoded value of a single column, as used in equality predicates
    fn column_value(&self, column: &str) -> Result<SqlValue> {
        let row = self.to_row()?;
        let table = Self::schema().name;
        row.get(column)
            .cloned()
            .ok_or_else(|| schema_error(column, "no such column").with_table(table))
    }

    /// Encoded primary key value
    fn primary_key_value(&self) -> Result<SqlValue> {
        let schema = Self::schema();
        let pk = schema.primary_key().ok_or_else(|| {
            ExError::new(ExErrorKind::Schema)
                .with_table(schema.name.clone())
                .with_message("table has no primary key")
        })?;
        self.column_value(&pk.name)
    }
}
