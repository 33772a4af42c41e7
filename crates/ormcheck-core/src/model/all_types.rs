//! The record covering every supported field type

use super::sub_type::SubType;
use crate::codec::jsv;
use crate::codec::{
    encode_datetime, encode_datetime_offset, encode_decimal, encode_interval, encode_opt_interval,
    encode_u64, encode_uuid, read_bool, read_char, read_datetime, read_datetime_offset,
    read_decimal, read_f32, read_interval, read_jsv, read_narrow, read_opt_datetime,
    read_opt_interval, read_opt_narrow, read_u64, read_uuid,
};
use crate::equality::{
    compare, compare_map, compare_nested, compare_nested_seq, compare_seq, FieldMismatch,
    StructuralEq,
};
use crate::errors::Result;
use crate::schema::{ColumnDef, ColumnType, DecimalSpec, Table, TableSchema};
use crate::value::{Row, SqlValue};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Column names of the `AllTypes` table
pub mod col {
    pub const ID: &str = "Id";
    pub const NULLABLE_ID: &str = "NullableId";
    pub const SBYTE: &str = "SByte";
    pub const BYTE: &str = "Byte";
    pub const SHORT: &str = "Short";
    pub const INT: &str = "Int";
    pub const LONG: &str = "Long";
    pub const USHORT: &str = "UShort";
    pub const UINT: &str = "UInt";
    pub const ULONG: &str = "ULong";
    pub const FLOAT: &str = "Float";
    pub const DOUBLE: &str = "Double";
    pub const DECIMAL: &str = "Decimal";
    pub const STRING: &str = "String";
    pub const DATE_TIME: &str = "DateTime";
    pub const TIME_SPAN: &str = "TimeSpan";
    pub const DATE_TIME_OFFSET: &str = "DateTimeOffset";
    pub const GUID: &str = "Guid";
    pub const BOOL: &str = "Bool";
    pub const CHAR: &str = "Char";
    pub const NULLABLE_DATE_TIME: &str = "NullableDateTime";
    pub const NULLABLE_TIME_SPAN: &str = "NullableTimeSpan";
    pub const BYTE_ARRAY: &str = "ByteArray";
    pub const CHAR_ARRAY: &str = "CharArray";
    pub const INT_ARRAY: &str = "IntArray";
    pub const LONG_ARRAY: &str = "LongArray";
    pub const STRING_ARRAY: &str = "StringArray";
    pub const STRING_LIST: &str = "StringList";
    pub const STRING_MAP: &str = "StringMap";
    pub const INT_STRING_MAP: &str = "IntStringMap";
    pub const SUB_TYPE: &str = "SubType";
    pub const SUB_TYPES: &str = "SubTypes";
    pub const CUSTOM_TEXT: &str = "CustomText";
    pub const MAX_TEXT: &str = "MaxText";
    pub const CUSTOM_DECIMAL: &str = "CustomDecimal";
}

/// Declared maximum length of `CustomText`
pub const CUSTOM_TEXT_MAX_LEN: u32 = 100;

/// Declared precision and scale of `CustomDecimal`
pub const CUSTOM_DECIMAL_SPEC: DecimalSpec = DecimalSpec {
    precision: 10,
    scale: 2,
};

/// One value of every supported field type
///
/// `string_array` and `string_list` are both `Vec<String>`; they are kept as
/// separate columns because ORMs commonly distinguish fixed arrays from
/// growable lists and both shapes must survive storage.
#[derive(Debug, Clone)]
pub struct AllTypes {
    pub id: i32,
    pub nullable_id: Option<i32>,
    pub sbyte: i8,
    pub byte: u8,
    pub short: i16,
    pub int: i32,
    pub long: i64,
    pub ushort: u16,
    pub uint: u32,
    pub ulong: u64,
    pub float: f32,
    pub double: f64,
    pub decimal: Decimal,
    pub string: String,
    pub date_time: NaiveDateTime,
    pub time_span: Duration,
    pub date_time_offset: DateTime<FixedOffset>,
    pub guid: Uuid,
    pub boolean: bool,
    pub character: char,
    pub nullable_date_time: Option<NaiveDateTime>,
    pub nullable_time_span: Option<Duration>,
    pub byte_array: Vec<u8>,
    pub char_array: Vec<char>,
    pub int_array: Vec<i32>,
    pub long_array: Vec<i64>,
    pub string_array: Vec<String>,
    pub string_list: Vec<String>,
    pub string_map: BTreeMap<String, String>,
    pub int_string_map: BTreeMap<i32, String>,
    pub sub_type: SubType,
    pub sub_types: Vec<SubType>,
    /// At most [`CUSTOM_TEXT_MAX_LEN`] characters
    pub custom_text: String,
    pub max_text: String,
    /// Constrained to [`CUSTOM_DECIMAL_SPEC`]
    pub custom_decimal: Decimal,
}

impl AllTypes {
    /// Columns whose fixture values are unique per seed, so an equality
    /// lookup on any of them returns exactly one fixture row
    pub const EQUALITY_COLUMNS: &'static [&'static str] = &[
        col::ID,
        col::NULLABLE_ID,
        col::SBYTE,
        col::BYTE,
        col::SHORT,
        col::INT,
        col::LONG,
        col::USHORT,
        col::UINT,
        col::ULONG,
        col::FLOAT,
        col::DOUBLE,
        col::DECIMAL,
        col::STRING,
        col::DATE_TIME,
        col::TIME_SPAN,
        col::DATE_TIME_OFFSET,
        col::GUID,
        col::CHAR,
        col::NULLABLE_DATE_TIME,
        col::NULLABLE_TIME_SPAN,
        col::BYTE_ARRAY,
        col::CHAR_ARRAY,
        col::INT_ARRAY,
        col::LONG_ARRAY,
        col::STRING_ARRAY,
        col::STRING_LIST,
        col::STRING_MAP,
        col::INT_STRING_MAP,
        col::SUB_TYPE,
        col::SUB_TYPES,
        col::CUSTOM_TEXT,
        col::MAX_TEXT,
        col::CUSTOM_DECIMAL,
    ];
}

impl Table for AllTypes {
    fn schema() -> TableSchema {
        use ColumnType as T;
        TableSchema::new("AllTypes")
            .column(ColumnDef::new(col::ID, T::Int32).primary_key())
            .column(ColumnDef::new(col::NULLABLE_ID, T::Int32).nullable())
            .column(ColumnDef::new(col::SBYTE, T::Int8))
            .column(ColumnDef::new(col::BYTE, T::UInt8))
            .column(ColumnDef::new(col::SHORT, T::Int16))
            .column(ColumnDef::new(col::INT, T::Int32))
            .column(ColumnDef::new(col::LONG, T::Int64))
            .column(ColumnDef::new(col::USHORT, T::UInt16))
            .column(ColumnDef::new(col::UINT, T::UInt32))
            .column(ColumnDef::new(col::ULONG, T::UInt64))
            .column(ColumnDef::new(col::FLOAT, T::Float32))
            .column(ColumnDef::new(col::DOUBLE, T::Float64))
            .column(ColumnDef::new(col::DECIMAL, T::Decimal(None)))
            .column(ColumnDef::new(col::STRING, T::Text(None)))
            .column(ColumnDef::new(col::DATE_TIME, T::DateTime))
            .column(ColumnDef::new(col::TIME_SPAN, T::Interval))
            .column(ColumnDef::new(col::DATE_TIME_OFFSET, T::DateTimeOffset))
            .column(ColumnDef::new(col::GUID, T::Uuid))
            .column(ColumnDef::new(col::BOOL, T::Bool))
            .column(ColumnDef::new(col::CHAR, T::Char))
            .column(ColumnDef::new(col::NULLABLE_DATE_TIME, T::DateTime).nullable())
            .column(ColumnDef::new(col::NULLABLE_TIME_SPAN, T::Interval).nullable())
            .column(ColumnDef::new(col::BYTE_ARRAY, T::Blob))
            .column(ColumnDef::new(col::CHAR_ARRAY, T::Text(None)))
            .column(ColumnDef::new(col::INT_ARRAY, T::Serialized))
            .column(ColumnDef::new(col::LONG_ARRAY, T::Serialized))
            .column(ColumnDef::new(col::STRING_ARRAY, T::Serialized))
            .column(ColumnDef::new(col::STRING_LIST, T::Serialized))
            .column(ColumnDef::new(col::STRING_MAP, T::Serialized))
            .column(ColumnDef::new(col::INT_STRING_MAP, T::Serialized))
            .column(ColumnDef::new(col::SUB_TYPE, T::Serialized))
            .column(ColumnDef::new(col::SUB_TYPES, T::Serialized))
            .column(ColumnDef::new(
                col::CUSTOM_TEXT,
                T::Text(Some(CUSTOM_TEXT_MAX_LEN)),
            ))
            .column(ColumnDef::new(col::MAX_TEXT, T::MaxText))
            .column(ColumnDef::new(
                col::CUSTOM_DECIMAL,
                T::Decimal(Some(CUSTOM_DECIMAL_SPEC)),
            ))
    }

    fn to_row(&self) -> Result<Row> {
        Ok(Row::new()
            .with(col::ID, self.id)
            .with(col::NULLABLE_ID, self.nullable_id)
            .with(col::SBYTE, i64::from(self.sbyte))
            .with(col::BYTE, i64::from(self.byte))
            .with(col::SHORT, i64::from(self.short))
            .with(col::INT, self.int)
            .with(col::LONG, self.long)
            .with(col::USHORT, i64::from(self.ushort))
            .with(col::UINT, i64::from(self.uint))
            .with(col::ULONG, encode_u64(self.ulong))
            .with(col::FLOAT, f64::from(self.float))
            .with(col::DOUBLE, self.double)
            .with(
                col::DECIMAL,
                encode_decimal(col::DECIMAL, self.decimal, None)?,
            )
            .with(col::STRING, self.string.as_str())
            .with(col::DATE_TIME, encode_datetime(&self.date_time))
            .with(
                col::TIME_SPAN,
                encode_interval(col::TIME_SPAN, &self.time_span)?,
            )
            .with(
                col::DATE_TIME_OFFSET,
                encode_datetime_offset(&self.date_time_offset),
            )
            .with(col::GUID, encode_uuid(&self.guid))
            .with(col::BOOL, self.boolean)
            .with(col::CHAR, self.character.to_string())
            .with(
                col::NULLABLE_DATE_TIME,
                self.nullable_date_time
                    .as_ref()
                    .map_or(SqlValue::Null, encode_datetime),
            )
            .with(
                col::NULLABLE_TIME_SPAN,
                encode_opt_interval(col::NULLABLE_TIME_SPAN, &self.nullable_time_span)?,
            )
            .with(col::BYTE_ARRAY, self.byte_array.clone())
            .with(col::CHAR_ARRAY, self.char_array.iter().collect::<String>())
            .with(col::INT_ARRAY, jsv::to_string(&self.int_array))
            .with(col::LONG_ARRAY, jsv::to_string(&self.long_array))
            .with(col::STRING_ARRAY, jsv::to_string(&self.string_array))
            .with(col::STRING_LIST, jsv::to_string(&self.string_list))
            .with(col::STRING_MAP, jsv::to_string(&self.string_map))
            .with(col::INT_STRING_MAP, jsv::to_string(&self.int_string_map))
            .with(col::SUB_TYPE, jsv::to_string(&self.sub_type))
            .with(col::SUB_TYPES, jsv::to_string(&self.sub_types))
            .with(col::CUSTOM_TEXT, self.custom_text.as_str())
            .with(col::MAX_TEXT, self.max_text.as_str())
            .with(
                col::CUSTOM_DECIMAL,
                encode_decimal(
                    col::CUSTOM_DECIMAL,
                    self.custom_decimal,
                    Some(CUSTOM_DECIMAL_SPEC),
                )?,
            ))
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: read_narrow(row, col::ID, "i32")?,
            nullable_id: read_opt_narrow(row, col::NULLABLE_ID, "i32")?,
            sbyte: read_narrow(row, col::SBYTE, "i8")?,
            byte: read_narrow(row, col::BYTE, "u8")?,
            short: read_narrow(row, col::SHORT, "i16")?,
            int: read_narrow(row, col::INT, "i32")?,
            long: row.integer(col::LONG)?,
            ushort: read_narrow(row, col::USHORT, "u16")?,
            uint: read_narrow(row, col::UINT, "u32")?,
            ulong: read_u64(row, col::ULONG)?,
            float: read_f32(row, col::FLOAT)?,
            double: row.real(col::DOUBLE)?,
            decimal: read_decimal(row, col::DECIMAL)?,
            string: row.text(col::STRING)?.to_string(),
            date_time: read_datetime(row, col::DATE_TIME)?,
            time_span: read_interval(row, col::TIME_SPAN)?,
            date_time_offset: read_datetime_offset(row, col::DATE_TIME_OFFSET)?,
            guid: read_uuid(row, col::GUID)?,
            boolean: read_bool(row, col::BOOL)?,
            character: read_char(row, col::CHAR)?,
            nullable_date_time: read_opt_datetime(row, col::NULLABLE_DATE_TIME)?,
            nullable_time_span: read_opt_interval(row, col::NULLABLE_TIME_SPAN)?,
            byte_array: row.blob(col::BYTE_ARRAY)?.to_vec(),
            char_array: row.text(col::CHAR_ARRAY)?.chars().collect(),
            int_array: read_jsv(row, col::INT_ARRAY)?,
            long_array: read_jsv(row, col::LONG_ARRAY)?,
            string_array: read_jsv(row, col::STRING_ARRAY)?,
            string_list: read_jsv(row, col::STRING_LIST)?,
            string_map: read_jsv(row, col::STRING_MAP)?,
            int_string_map: read_jsv(row, col::INT_STRING_MAP)?,
            sub_type: read_jsv(row, col::SUB_TYPE)?,
            sub_types: read_jsv(row, col::SUB_TYPES)?,
            custom_text: row.text(col::CUSTOM_TEXT)?.to_string(),
            max_text: row.text(col::MAX_TEXT)?.to_string(),
            custom_decimal: read_decimal(row, col::CUSTOM_DECIMAL)?,
        })
    }
}

impl StructuralEq for AllTypes {
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch> {
        compare(col::ID, &self.id, &other.id)
            .or_else(|| compare(col::NULLABLE_ID, &self.nullable_id, &other.nullable_id))
            .or_else(|| compare(col::SBYTE, &self.sbyte, &other.sbyte))
            .or_else(|| compare(col::BYTE, &self.byte, &other.byte))
            .or_else(|| compare(col::SHORT, &self.short, &other.short))
            .or_else(|| compare(col::INT, &self.int, &other.int))
            .or_else(|| compare(col::LONG, &self.long, &other.long))
            .or_else(|| compare(col::USHORT, &self.ushort, &other.ushort))
            .or_else(|| compare(col::UINT, &self.uint, &other.uint))
            .or_else(|| compare(col::ULONG, &self.ulong, &other.ulong))
            .or_else(|| compare(col::FLOAT, &self.float, &other.float))
            .or_else(|| compare(col::DOUBLE, &self.double, &other.double))
            .or_else(|| compare(col::DECIMAL, &self.decimal, &other.decimal))
            .or_else(|| compare(col::STRING, &self.string, &other.string))
            .or_else(|| compare(col::DATE_TIME, &self.date_time, &other.date_time))
            .or_else(|| compare(col::TIME_SPAN, &self.time_span, &other.time_span))
            .or_else(|| {
                // instant and offset both have to survive
                compare(
                    col::DATE_TIME_OFFSET,
                    &self.date_time_offset,
                    &other.date_time_offset,
                )
                .or_else(|| {
                    compare(
                        col::DATE_TIME_OFFSET,
                        self.date_time_offset.offset(),
                        other.date_time_offset.offset(),
                    )
                })
            })
            .or_else(|| compare(col::GUID, &self.guid, &other.guid))
            .or_else(|| compare(col::BOOL, &self.boolean, &other.boolean))
            .or_else(|| compare(col::CHAR, &self.character, &other.character))
            .or_else(|| {
                compare(
                    col::NULLABLE_DATE_TIME,
                    &self.nullable_date_time,
                    &other.nullable_date_time,
                )
            })
            .or_else(|| {
                compare(
                    col::NULLABLE_TIME_SPAN,
                    &self.nullable_time_span,
                    &other.nullable_time_span,
                )
            })
            .or_else(|| compare_seq(col::BYTE_ARRAY, &self.byte_array, &other.byte_array))
            .or_else(|| compare_seq(col::CHAR_ARRAY, &self.char_array, &other.char_array))
            .or_else(|| compare_seq(col::INT_ARRAY, &self.int_array, &other.int_array))
            .or_else(|| compare_seq(col::LONG_ARRAY, &self.long_array, &other.long_array))
            .or_else(|| compare_seq(col::STRING_ARRAY, &self.string_array, &other.string_array))
            .or_else(|| compare_seq(col::STRING_LIST, &self.string_list, &other.string_list))
            .or_else(|| compare_map(col::STRING_MAP, &self.string_map, &other.string_map))
            .or_else(|| {
                compare_map(
                    col::INT_STRING_MAP,
                    &self.int_string_map,
                    &other.int_string_map,
                )
            })
            .or_else(|| compare_nested(col::SUB_TYPE, &self.sub_type, &other.sub_type))
            .or_else(|| compare_nested_seq(col::SUB_TYPES, &self.sub_types, &other.sub_types))
            .or_else(|| compare(col::CUSTOM_TEXT, &self.custom_text, &other.custom_text))
            .or_else(|| compare(col::MAX_TEXT, &self.max_text, &other.max_text))
            .or_else(|| {
                compare(
                    col::CUSTOM_DECIMAL,
                    &self.custom_decimal,
                    &other.custom_decimal,
                )
            })
    }
}

impl PartialEq for AllTypes {
    fn eq(&self, other: &Self) -> bool {
        self.structural_equals(other)
    }
}
