use crate::codec::{encode_uuid, jsv, read_jsv, read_uuid};
use crate::equality::{compare, compare_seq, FieldMismatch, StructuralEq};
use crate::errors::Result;
use crate::schema::{ColumnDef, ColumnType, Table, TableSchema};
use crate::value::Row;
use uuid::Uuid;

pub mod col {
    pub const GUID_ONE: &str = "GuidOne";
    pub const GUID_TWO: &str = "GuidTwo";
    pub const THE_GUIDS: &str = "TheGuids";
}

/// Two GUID columns and a GUID sequence serialized into one text column
///
/// The table has no primary key; rows are only read back by column.
#[derive(Debug, Clone, PartialEq)]
pub struct WithAListOfGuids {
    pub guid_one: Uuid,
    pub guid_two: Uuid,
    pub the_guids: Vec<Uuid>,
}

impl Table for WithAListOfGuids {
    fn schema() -> TableSchema {
        TableSchema::new("WithAListOfGuids")
            .column(ColumnDef::new(col::GUID_ONE, ColumnType::Uuid))
            .column(ColumnDef::new(col::GUID_TWO, ColumnType::Uuid))
            .column(ColumnDef::new(col::THE_GUIDS, ColumnType::Serialized))
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::GUID_ONE, encode_uuid(&self.guid_one))
            .with(col::GUID_TWO, encode_uuid(&self.guid_two))
            .with(col::THE_GUIDS, jsv::to_string(&self.the_guids)))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            guid_one: read_uuid(row, col::GUID_ONE)?,
            guid_two: read_uuid(row, col::GUID_TWO)?,
            the_guids: read_jsv(row, col::THE_GUIDS)?,
        })
    }
}

impl StructuralEq for WithAListOfGuids {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::GUID_ONE, &self.guid_one, &other.guid_one)
            .or_else(|| compare(col::GUID_TWO, &self.guid_two, &other.guid_two))
            .or_else(|| compare_seq(col::THE_GUIDS, &self.the_guids, &other.the_guids))
    }
}
