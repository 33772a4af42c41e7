use crate::codec::{encode_decimal, read_decimal, read_f32, read_narrow};
use crate::equality::{compare, FieldMismatch, StructuralEq};
use crate::errors::Result;
use crate::schema::{ColumnDef, ColumnType, Table, TableSchema};
use crate::value::Row;
use rust_decimal::Decimal;

pub mod col {
    pub const ID: &str = "Id";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";
    pub const TOP: &str = "Top";
    pub const LEFT: &str = "Left";
}

/// Float query fixture with a backend-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: i32,
    pub width: i16,
    pub height: f32,
    pub top: f64,
    pub left: Decimal,
}

impl Table for Point {
    fn schema() -> TableSchema {
        TableSchema::new("Point")
            .column(ColumnDef::new(col::ID, ColumnType::Int32).auto_increment())
            .column(ColumnDef::new(col::WIDTH, ColumnType::Int16))
            .column(ColumnDef::new(col::HEIGHT, ColumnType::Float32))
            .column(ColumnDef::new(col::TOP, ColumnType::Float64))
            .column(ColumnDef::new(col::LEFT, ColumnType::Decimal(None)))
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::ID, self.id)
            .with(col::WIDTH, i64::from(self.width))
            .with(col::HEIGHT, f64::from(self.height))
            .with(col::TOP, self.top)
            .with(col::LEFT, encode_decimal(col::LEFT, self.left, None)?))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: read_narrow(row, col::ID, "i32")?,
            width: read_narrow(row, col::WIDTH, "i16")?,
            height: read_f32(row, col::HEIGHT)?,
            top: row.real(col::TOP)?,
            left: read_decimal(row, col::LEFT)?,
        })
    }
}

impl StructuralEq for Point {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::ID, &self.id, &other.id)
            .or_else(|| compare(col::WIDTH, &self.width, &other.width))
            .or_else(|| compare(col::HEIGHT, &self.height, &other.height))
            .or_else(|| compare(col::TOP, &self.top, &other.top))
            .or_else(|| compare(col::LEFT, &self.left, &other.left))
    }
}
