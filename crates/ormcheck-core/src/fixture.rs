//! Deterministic `AllTypes` fixtures
//!
//! `create_fixture` is total over `i32`: integer fields use wrapping
//! arithmetic, calendar fields cycle every [`CALENDAR_CYCLE`] seeds and
//! `CustomDecimal` cycles every [`CUSTOM_DECIMAL_CYCLE`] seeds so every value
//! fits its column. Distinct seeds always yield distinct records
//! (`Id`, `Int`, `Long`, `String` and `Guid` are injective in the seed), even
//! though narrow fields such as `Byte` repeat.

use crate::model::{AllTypes, SubType};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Seeds per calendar cycle (about a century of days)
pub const CALENDAR_CYCLE: i32 = 36_500;

/// Seeds per `CustomDecimal` cycle; keeps the value within DECIMAL(10,2)
pub const CUSTOM_DECIMAL_CYCLE: i32 = 10_000_000;

/// High bits shared by every fixture GUID; the low 32 bits carry the seed
const FIXTURE_GUID_PREFIX: u128 = 0x6f72_6d63_0000_8000_8000_0000_0000_0000;

/// Letters for `CharArray` stay below the surrogate range
const CHAR_ARRAY_SPAN: i32 = 0xD700;

fn base_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("2000-01-01 is a valid date")
}

fn fixture_datetime(k: i64) -> NaiveDateTime {
    base_datetime() + Duration::days(k) + Duration::hours(k % 24) + Duration::microseconds(k)
}

fn fixture_span(k: i64) -> Duration {
    Duration::days(k)
        + Duration::hours(k)
        + Duration::minutes(k)
        + Duration::seconds(k)
        + Duration::milliseconds(k)
}

fn fixture_offset(k: i64) -> FixedOffset {
    let hours = (k % 14) as i32;
    FixedOffset::east_opt(hours * 3600).expect("offset below 14 hours is valid")
}

/// Deterministic, seed-unique GUID
pub fn fixture_guid(seed: i32) -> Uuid {
    Uuid::from_u128(FIXTURE_GUID_PREFIX | u128::from(seed as u32))
}

/// A code point in `1..=0xD7FF`, which includes control characters
fn fixture_char(seed: i32) -> char {
    let code = 1 + seed.rem_euclid(0xD7FF) as u32;
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn letter(seed: i32, offset: u32) -> char {
    let code = u32::from(b'A') + seed.rem_euclid(CHAR_ARRAY_SPAN) as u32 + offset;
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Build the `AllTypes` record for `seed`
pub fn create_fixture(seed: i32) -> AllTypes {
    let k = i64::from(seed.rem_euclid(CALENDAR_CYCLE));
    let wide = i64::from(seed);
    let next = seed.wrapping_add(1);
    let bounded = i64::from(seed.rem_euclid(CUSTOM_DECIMAL_CYCLE));
    let date_time = fixture_datetime(k);
    let time_span = fixture_span(k);

    AllTypes {
        id: seed.wrapping_add(1),
        nullable_id: Some(seed.wrapping_add(2)),
        sbyte: seed.wrapping_add(2) as i8,
        byte: seed.wrapping_add(3) as u8,
        short: seed.wrapping_add(4) as i16,
        int: seed.wrapping_add(5),
        long: wide + 6,
        ushort: seed.wrapping_add(7) as u16,
        uint: seed.wrapping_add(8) as u32,
        ulong: (wide + 9) as u64,
        float: (wide as f64 + 10.1) as f32,
        double: wide as f64 + 11.1,
        decimal: Decimal::new(wide * 10 + 121, 1),
        string: format!("String{}", seed),
        date_time,
        time_span,
        date_time_offset: DateTime::from_naive_utc_and_offset(date_time, fixture_offset(k)),
        guid: fixture_guid(seed),
        boolean: seed % 2 == 0,
        character: fixture_char(seed),
        nullable_date_time: Some(date_time),
        nullable_time_span: Some(time_span),
        byte_array: vec![seed as u8, seed.wrapping_add(1) as u8],
        char_array: vec![letter(seed, 0), letter(seed, 1)],
        int_array: vec![seed, seed.wrapping_add(1)],
        long_array: vec![wide, wide + 1],
        string_array: vec![seed.to_string()],
        string_list: vec![seed.to_string()],
        string_map: BTreeMap::from([(format!("Key{}", seed), format!("Value{}", seed))]),
        int_string_map: BTreeMap::from([(seed, format!("Value{}", seed))]),
        sub_type: SubType::new(seed, format!("Name{}", seed)),
        sub_types: vec![
            SubType::new(seed, format!("Name{}", seed)),
            SubType::new(next, format!("Name{}", next)),
        ],
        custom_text: format!("CustomText{}", seed),
        max_text: format!("MaxText{}", seed),
        custom_decimal: Decimal::new(bounded * 100 + 1313, 2),
    }
}

/// Fixtures for seeds `0..n`
pub fn create_fixtures(n: i32) -> Vec<AllTypes> {
    (0..n).map(create_fixture).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_zero() {
        let f = create_fixture(0);
        assert_eq!(f.id, 1);
        assert_eq!(f.byte, 3);
        assert_eq!(f.string, "String0");
        assert_eq!(f.string_array, vec!["0".to_string()]);
        assert_eq!(f.sub_type, SubType::new(0, "Name0"));
        assert_eq!(f.date_time, base_datetime());
        assert_eq!(f.decimal, Decimal::new(121, 1));
        assert_eq!(f.custom_decimal, Decimal::new(1313, 2));
    }

    #[test]
    fn test_extreme_seeds_are_total() {
        for seed in [i32::MIN, -1, i32::MAX] {
            let f = create_fixture(seed);
            assert_eq!(f.string, format!("String{}", seed));
            assert_eq!(f.char_array.len(), 2);
        }
    }

    #[test]
    fn test_custom_decimal_fits_declared_precision_for_any_seed() {
        use crate::codec::encode_decimal;
        use crate::model::all_types::{col, CUSTOM_DECIMAL_SPEC};

        for seed in [i32::MIN, -1, 99_999_987, 100_000_000, i32::MAX] {
            let value = create_fixture(seed).custom_decimal;
            let encoded = encode_decimal(col::CUSTOM_DECIMAL, value, Some(CUSTOM_DECIMAL_SPEC));
            assert!(encoded.is_ok(), "seed {}: {:?}", seed, encoded);
        }
    }

    #[test]
    fn test_offset_preserved_in_fixture() {
        let f = create_fixture(5);
        assert_eq!(f.date_time_offset.offset().local_minus_utc(), 5 * 3600);
        assert_eq!(f.date_time_offset.naive_utc(), f.date_time);
    }
}
