use crate::codec::read_narrow;
use crate::equality::{compare, FieldMismatch, StructuralEq};
use crate::errors::Result;
use crate::schema::{ColumnDef, ColumnType, Table, TableSchema};
use crate::value::Row;
use std::ops::BitOr;

/// Bit-flag set stored as its raw integer value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagsEnum(i32);

impl FlagsEnum {
    pub const FLAG_ONE: FlagsEnum = FlagsEnum(0x0);
    pub const FLAG_TWO: FlagsEnum = FlagsEnum(0x1);
    pub const FLAG_THREE: FlagsEnum = FlagsEnum(0x2);

    pub fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, other: FlagsEnum) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FlagsEnum {
    type Output = FlagsEnum;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

pub mod col {
    pub const ID: &str = "Id";
    pub const FLAGS: &str = "Flags";
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeWithFlagsEnum {
    pub id: i32,
    pub flags: FlagsEnum,
}

impl Table for TypeWithFlagsEnum {
    fn schema() -> TableSchema {
        TableSchema::new("TypeWithFlagsEnum")
            .column(ColumnDef::new(col::ID, ColumnType::Int32).primary_key())
            .column(ColumnDef::new(col::FLAGS, ColumnType::Int32))
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::ID, self.id)
            .with(col::FLAGS, self.flags.bits()))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: read_narrow(row, col::ID, "i32")?,
            flags: FlagsEnum::from_bits(read_narrow(row, col::FLAGS, "i32")?),
        })
    }
}

impl StructuralEq for TypeWithFlagsEnum {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::ID, &self.id, &other.id)
            .or_else(|| compare(col::FLAGS, &self.flags, &other.flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_union() {
        let both = FlagsEnum::FLAG_ONE | FlagsEnum::FLAG_TWO;
        assert_eq!(both.bits(), 1);
        assert!(both.contains(FlagsEnum::FLAG_TWO));
        assert!(!both.contains(FlagsEnum::FLAG_THREE));
    }

    #[test]
    fn test_flags_stored_as_raw_integer() {
        let row = TypeWithFlagsEnum {
            id: 1,
            flags: FlagsEnum::FLAG_THREE,
        }
        .to_row()
        .unwrap();
        assert_eq!(row.integer(col::FLAGS).unwrap(), 2);
    }
}
