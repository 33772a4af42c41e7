//! Column encodings
//!
//! Every semantic field type has exactly one storage encoding. Scalars map to
//! a single storage class here; collections and nested records go through the
//! [`jsv`] text encoding.

pub mod jsv;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::schema::DecimalSpec;
use crate::value::{Row, SqlValue};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, SecondsFormat};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Failures decoding stored text back into typed values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedChar {
        found: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("cannot read '{value}' as {target}")]
    InvalidScalar { value: String, target: &'static str },

    #[error("expected a {expected}")]
    WrongShape { expected: &'static str },

    #[error("record is missing field {0}")]
    MissingField(&'static str),
}

impl From<CodecError> for ExError {
    fn from(err: CodecError) -> Self {
        ExError::new(ExErrorKind::Serialization)
            .with_op("decode")
            .with_message(err.to_string())
    }
}

/// Attach the column name to a decoding failure
pub(crate) fn in_column(column: &str) -> impl FnOnce(CodecError) -> ExError + '_ {
    move |err| ExError::from(err).with_field(column)
}

fn invalid(value: impl ToString, target: &'static str) -> CodecError {
    CodecError::InvalidScalar {
        value: value.to_string(),
        target,
    }
}

/// Narrow an INTEGER column to a smaller integer type
pub fn read_narrow<T: TryFrom<i64>>(row: &Row, column: &str, target: &'static str) -> Result<T> {
    let v = row.integer(column)?;
    T::try_from(v).map_err(|_| in_column(column)(invalid(v, target)))
}

pub fn read_opt_narrow<T: TryFrom<i64>>(
    row: &Row,
    column: &str,
    target: &'static str,
) -> Result<Option<T>> {
    row.opt_integer(column)?
        .map(|v| T::try_from(v).map_err(|_| in_column(column)(invalid(v, target))))
        .transpose()
}

/// u64 is stored as its two's-complement i64 bit pattern
pub fn encode_u64(v: u64) -> SqlValue {
    SqlValue::Integer(v as i64)
}

pub fn read_u64(row: &Row, column: &str) -> Result<u64> {
    Ok(row.integer(column)? as u64)
}

pub fn read_bool(row: &Row, column: &str) -> Result<bool> {
    match row.integer(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(in_column(column)(invalid(other, "bool"))),
    }
}

/// f32 widens to f64 exactly; a stored value with no exact f32 form was altered by the backend
pub fn read_f32(row: &Row, column: &str) -> Result<f32> {
    let stored = row.real(column)?;
    let narrowed = stored as f32;
    if f64::from(narrowed) != stored && !stored.is_nan() {
        return Err(ExError::new(ExErrorKind::PrecisionLoss)
            .with_field(column)
            .with_message("stored REAL has no exact single-precision value")
            .with_actual(format!("{:?}", stored)));
    }
    Ok(narrowed)
}

/// Canonical decimal text, fixed to the declared scale when a spec is given
///
/// Values that cannot be represented within (precision, scale) are rejected
/// instead of being rounded.
pub fn encode_decimal(column: &str, value: Decimal, spec: Option<DecimalSpec>) -> Result<SqlValue> {
    let Some(spec) = spec else {
        return Ok(SqlValue::Text(value.normalize().to_string()));
    };

    let precision_loss = |reason: String| {
        ExError::new(ExErrorKind::PrecisionLoss)
            .with_op("encode_decimal")
            .with_field(column)
            .with_message(reason)
            .with_expected(format!("DECIMAL({},{})", spec.precision, spec.scale))
            .with_actual(value.to_string())
    };

    if value.round_dp(u32::from(spec.scale)) != value {
        return Err(precision_loss(format!(
            "more than {} fractional digits",
            spec.scale
        )));
    }

    let mut fixed = value;
    fixed.rescale(u32::from(spec.scale));
    let digits = fixed.mantissa().unsigned_abs().to_string().len();
    if digits > spec.precision as usize {
        return Err(precision_loss(format!(
            "{} significant digits exceed precision {}",
            digits, spec.precision
        )));
    }

    Ok(SqlValue::Text(fixed.to_string()))
}

pub fn read_decimal(row: &Row, column: &str) -> Result<Decimal> {
    let text = row.text(column)?;
    Decimal::from_str(text).map_err(|_| in_column(column)(invalid(text, "decimal")))
}

/// Microseconds since the Unix epoch
pub fn encode_datetime(value: &NaiveDateTime) -> SqlValue {
    SqlValue::Integer(value.and_utc().timestamp_micros())
}

fn datetime_from_micros(column: &str, micros: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| in_column(column)(invalid(micros, "timestamp")))
}

pub fn read_datetime(row: &Row, column: &str) -> Result<NaiveDateTime> {
    datetime_from_micros(column, row.integer(column)?)
}

pub fn read_opt_datetime(row: &Row, column: &str) -> Result<Option<NaiveDateTime>> {
    row.opt_integer(column)?
        .map(|micros| datetime_from_micros(column, micros))
        .transpose()
}

/// RFC 3339 with microseconds and an explicit offset
pub fn encode_datetime_offset(value: &DateTime<FixedOffset>) -> SqlValue {
    SqlValue::Text(value.to_rfc3339_opts(SecondsFormat::Micros, false))
}

pub fn read_datetime_offset(row: &Row, column: &str) -> Result<DateTime<FixedOffset>> {
    let text = row.text(column)?;
    DateTime::parse_from_rfc3339(text).map_err(|_| in_column(column)(invalid(text, "timestamptz")))
}

/// Whole microseconds; sub-microsecond spans would be truncated, so they are rejected
pub fn encode_interval(column: &str, value: &Duration) -> Result<SqlValue> {
    let micros = value.num_microseconds().ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_field(column)
            .with_message("interval does not fit in 64-bit microseconds")
    })?;
    if Duration::microseconds(micros) != *value {
        return Err(ExError::new(ExErrorKind::PrecisionLoss)
            .with_field(column)
            .with_message("interval has sub-microsecond precision"));
    }
    Ok(SqlValue::Integer(micros))
}

pub fn read_interval(row: &Row, column: &str) -> Result<Duration> {
    Ok(Duration::microseconds(row.integer(column)?))
}

pub fn read_opt_interval(row: &Row, column: &str) -> Result<Option<Duration>> {
    Ok(row.opt_integer(column)?.map(Duration::microseconds))
}

pub fn encode_opt_interval(column: &str, value: &Option<Duration>) -> Result<SqlValue> {
    match value {
        Some(v) => encode_interval(column, v),
        None => Ok(SqlValue::Null),
    }
}

/// Lowercase hyphenated form
pub fn encode_uuid(value: &Uuid) -> SqlValue {
    SqlValue::Text(value.hyphenated().to_string())
}

pub fn read_uuid(row: &Row, column: &str) -> Result<Uuid> {
    let text = row.text(column)?;
    Uuid::parse_str(text).map_err(|_| in_column(column)(invalid(text, "uuid")))
}

pub fn read_char(row: &Row, column: &str) -> Result<char> {
    let text = row.text(column)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(in_column(column)(invalid(text, "char"))),
    }
}

/// Decode a JSV text column
pub fn read_jsv<T: jsv::JsvDecode>(row: &Row, column: &str) -> Result<T> {
    jsv::from_str(row.text(column)?).map_err(in_column(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(precision: u8, scale: u8) -> Option<DecimalSpec> {
        Some(DecimalSpec { precision, scale })
    }

    #[test]
    fn test_decimal_fixed_to_declared_scale() {
        let v = encode_decimal("D", Decimal::new(1313, 2), spec(10, 2)).unwrap();
        assert_eq!(v, SqlValue::Text("13.13".to_string()));
        let v = encode_decimal("D", Decimal::new(5, 0), spec(10, 2)).unwrap();
        assert_eq!(v, SqlValue::Text("5.00".to_string()));
    }

    #[test]
    fn test_decimal_rejects_extra_fraction_digits() {
        let err = encode_decimal("D", Decimal::new(13131, 3), spec(10, 2)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PrecisionLoss);
        assert_eq!(err.field(), Some("D"));
    }

    #[test]
    fn test_decimal_rejects_precision_overflow() {
        // 123456789.00 has 11 significant digits
        let err = encode_decimal("D", Decimal::new(123_456_789, 0), spec(10, 2)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PrecisionLoss);
    }

    #[test]
    fn test_unconstrained_decimal_is_normalized() {
        let v = encode_decimal("D", Decimal::new(14100, 3), None).unwrap();
        assert_eq!(v, SqlValue::Text("14.1".to_string()));
    }

    #[test]
    fn test_u64_bit_pattern_round_trip() {
        let row = Row::new().with("U", encode_u64(u64::MAX));
        assert_eq!(row.integer("U").unwrap(), -1);
        assert_eq!(read_u64(&row, "U").unwrap(), u64::MAX);
    }

    #[test]
    fn test_narrow_out_of_range() {
        let row = Row::new().with("B", 300i64);
        let err = read_narrow::<u8>(&row, "B", "u8").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
        assert_eq!(err.field(), Some("B"));
    }

    #[test]
    fn test_f32_detects_widened_value() {
        let row = Row::new().with("F", 0.1f64);
        assert_eq!(
            read_f32(&row, "F").unwrap_err().kind(),
            ExErrorKind::PrecisionLoss
        );
        let row = Row::new().with("F", f64::from(10.1f32));
        assert_eq!(read_f32(&row, "F").unwrap(), 10.1f32);
    }

    #[test]
    fn test_datetime_offset_keeps_offset() {
        let dt = DateTime::parse_from_rfc3339("2001-02-03T04:05:06.000007+05:00").unwrap();
        let row = Row::new().with("O", encode_datetime_offset(&dt));
        assert_eq!(row.text("O").unwrap(), "2001-02-03T04:05:06.000007+05:00");
        let back = read_datetime_offset(&row, "O").unwrap();
        assert_eq!(back, dt);
        assert_eq!(back.offset(), dt.offset());
    }

    #[test]
    fn test_interval_rejects_nanoseconds() {
        let err = encode_interval("T", &Duration::nanoseconds(1500)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PrecisionLoss);
    }

    #[test]
    fn test_char_requires_single_character() {
        let row = Row::new().with("C", "ab");
        assert!(read_char(&row, "C").is_err());
        let row = Row::new().with("C", "é");
        assert_eq!(read_char(&row, "C").unwrap(), 'é');
    }
}
