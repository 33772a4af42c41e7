#![allow(clippy::unwrap_used, clippy::expect_used)]

use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::ExErrorKind;
use ormcheck_core::fixture::create_fixture;
use ormcheck_core::model::all_types::col;
use ormcheck_core::model::{AllTypes, SubType};
use ormcheck_core::{SqlValue, StructuralEq, Table};
use rust_decimal::Decimal;

#[test]
fn test_row_mapping_round_trips_in_memory() {
    for seed in [0, 1, 2, 61, -5, -20, 36_499, 99_999_000] {
        let original = create_fixture(seed);
        let back = AllTypes::from_row(&original.to_row().unwrap()).unwrap();
        assert!(
            original.first_mismatch(&back).is_none(),
            "seed {}: {:?}",
            seed,
            original.first_mismatch(&back)
        );
    }
}

#[test]
fn test_every_schema_column_is_encoded() {
    let row = create_fixture(0).to_row().unwrap();
    let schema = AllTypes::schema();
    assert_eq!(row.len(), schema.columns.len());
    for column in &schema.columns {
        assert!(row.get(&column.name).is_some(), "missing {}", column.name);
    }
}

#[test]
fn test_collection_columns_use_jsv_text() {
    let row = create_fixture(0).to_row().unwrap();
    assert_eq!(row.text(col::INT_ARRAY).unwrap(), "[0,1]");
    assert_eq!(row.text(col::STRING_ARRAY).unwrap(), "[0]");
    assert_eq!(row.text(col::STRING_MAP).unwrap(), "{Key0:Value0}");
    assert_eq!(row.text(col::INT_STRING_MAP).unwrap(), "{0:Value0}");
    assert_eq!(row.text(col::SUB_TYPE).unwrap(), "{Id:0,Name:Name0}");
    assert_eq!(
        row.text(col::SUB_TYPES).unwrap(),
        "[{Id:0,Name:Name0},{Id:1,Name:Name1}]"
    );
    assert_eq!(row.text(col::CHAR_ARRAY).unwrap(), "AB");
    assert_eq!(row.blob(col::BYTE_ARRAY).unwrap(), &[0u8, 1]);
}

#[test]
fn test_scalar_encodings() {
    let row = create_fixture(0).to_row().unwrap();
    assert_eq!(row.get(col::BOOL), Some(&SqlValue::Integer(1)));
    assert_eq!(row.text(col::DECIMAL).unwrap(), "12.1");
    assert_eq!(row.text(col::CUSTOM_DECIMAL).unwrap(), "13.13");
    assert_eq!(row.integer(col::DATE_TIME).unwrap(), 946_684_800_000_000);
    assert_eq!(
        row.text(col::DATE_TIME_OFFSET).unwrap(),
        "2000-01-01T00:00:00.000000+00:00"
    );
    assert_eq!(row.text(col::CHAR).unwrap(), "\u{1}");
}

#[test]
fn test_none_nullables_encode_as_null() {
    let mut record = create_fixture(1);
    record.nullable_id = None;
    record.nullable_date_time = None;
    record.nullable_time_span = None;
    let row = record.to_row().unwrap();
    assert!(row.get(col::NULLABLE_ID).unwrap().is_null());
    let back = AllTypes::from_row(&row).unwrap();
    assert_eq!(back.nullable_time_span, None);
    assert!(record.structural_equals(&back));
}

#[test]
fn test_custom_decimal_out_of_spec_is_rejected_on_encode() {
    let mut record = create_fixture(0);
    record.custom_decimal = Decimal::new(1_234_567, 4);
    let err = record.to_row().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PrecisionLoss);
    assert_eq!(err.field(), Some(col::CUSTOM_DECIMAL));
}

#[test]
fn test_custom_text_over_bound_fails_validation() {
    let mut record = create_fixture(0);
    record.custom_text = "x".repeat(101);
    let row = record.to_row().unwrap();
    let err = AllTypes::schema()
        .validate_row(&row, &Dialect::Sqlite.capabilities())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(err.field(), Some(col::CUSTOM_TEXT));

    record.custom_text = "x".repeat(100);
    let row = record.to_row().unwrap();
    assert!(AllTypes::schema()
        .validate_row(&row, &Dialect::Sqlite.capabilities())
        .is_ok());
}

#[test]
fn test_mismatch_paths_for_nested_and_mapped_fields() {
    let expected = create_fixture(0);

    let mut actual = expected.clone();
    actual.sub_types[1] = SubType::new(1, "Other");
    assert_eq!(
        expected.first_mismatch(&actual).unwrap().field,
        "SubTypes[1].Name"
    );

    let mut actual = expected.clone();
    actual
        .string_map
        .insert("Key0".to_string(), "Changed".to_string());
    assert_eq!(
        expected.first_mismatch(&actual).unwrap().field,
        "StringMap[\"Key0\"]"
    );
}

#[test]
fn test_offset_change_is_a_mismatch_even_at_same_instant() {
    let expected = create_fixture(3);
    let mut actual = expected.clone();
    actual.date_time_offset = actual.date_time_offset.with_timezone(
        &chrono::FixedOffset::east_opt(0).unwrap(),
    );
    assert_eq!(
        expected.first_mismatch(&actual).unwrap().field,
        col::DATE_TIME_OFFSET
    );
}

#[test]
fn test_column_value_matches_row_encoding() {
    let record = create_fixture(2);
    let row = record.to_row().unwrap();
    for column in AllTypes::EQUALITY_COLUMNS {
        assert_eq!(Some(&record.column_value(column).unwrap()), row.get(column));
    }
    assert_eq!(record.primary_key_value().unwrap(), SqlValue::Integer(3));
}
