#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for the round-trip checker over in-memory SQLite
// Covers: round-trip identity, field-equality lookups, updates, lookup errors

use ormcheck_core::errors::ExErrorKind;
use ormcheck_core::fixture::{create_fixture, create_fixtures};
use ormcheck_core::model::all_types::col;
use ormcheck_core::model::AllTypes;
use ormcheck_core::{StructuralEq, Table};
use ormcheck_store::{Order, Predicate, RoundTripChecker, SqliteBackend};

fn checker() -> RoundTripChecker {
    let backend = SqliteBackend::open_in_memory().unwrap();
    RoundTripChecker::new(Box::new(backend))
}

fn checker_with(seeds: &[i32]) -> RoundTripChecker {
    let mut checker = checker();
    checker.recreate::<AllTypes>().unwrap();
    let fixtures: Vec<AllTypes> = seeds.iter().copied().map(create_fixture).collect();
    checker.persist(&fixtures).unwrap();
    checker
}

#[test]
fn test_fetch_by_id_round_trips_every_fixture() {
    // Given: Fixtures for seeds 0..5 persisted in one batch
    let mut checker = checker();
    checker.recreate::<AllTypes>().unwrap();
    let fixtures = create_fixtures(5);
    assert_eq!(checker.persist(&fixtures).unwrap(), 5);

    // When/Then: Each one reads back structurally equal
    for fixture in &fixtures {
        let back = checker.fetch_by_id::<AllTypes>(fixture.id).unwrap();
        assert!(
            fixture.structural_equals(&back),
            "id {}: {:?}",
            fixture.id,
            fixture.first_mismatch(&back)
        );
    }
}

#[test]
fn test_extreme_seeds_round_trip() {
    // Given: Seeds at the edges of the calendar cycle and negative seeds
    let seeds = [-36_501, -1, 36_499, 36_500, 1_000_000];
    let mut checker = checker_with(&seeds);

    // Then: Each record survives storage intact
    for seed in seeds {
        let expected = create_fixture(seed);
        checker.verify_round_trip(&expected).unwrap();
    }
}

#[test]
fn test_seed_zero_reads_back_documented_values() {
    // Given: The seed-0 fixture persisted
    let mut checker = checker_with(&[0]);

    // When: Fetching Id 1
    let back = checker.fetch_by_id::<AllTypes>(1).unwrap();

    // Then: The documented seed-0 values come back
    assert_eq!(back.id, 1);
    assert_eq!(back.byte, 3);
    assert_eq!(back.string, "String0");
    assert_eq!(back.string_array, vec!["0".to_string()]);
    assert_eq!(back.sub_type.id, 0);
    assert_eq!(back.sub_type.name, "Name0");
}

#[test]
fn test_fetch_by_every_equality_field() {
    // Given: Three fixtures, the last of which is the lookup target
    let mut checker = checker_with(&[0, 1, 2]);
    let last = create_fixture(2);

    // When/Then: Every queryable field finds exactly that record
    for field in AllTypes::EQUALITY_COLUMNS {
        let value = last.column_value(field).unwrap();
        let found = checker
            .fetch_by_field_equality::<AllTypes>(field, value)
            .unwrap_or_else(|e| panic!("lookup by {} failed: {}", field, e));
        checker.verify(&last, &found).unwrap();
    }
}

#[test]
fn test_fetch_by_bool_newest_first() {
    // Given: Seeds 0..4, so Bool=true holds for seeds 0 and 2
    let mut checker = checker_with(&[0, 1, 2, 3]);

    // When: Selecting Bool=true ordered by Id descending
    let first = checker
        .fetch_first::<AllTypes>(&Predicate::eq(col::BOOL, true), &Order::desc(col::ID))
        .unwrap();

    // Then: The seed-2 record comes first
    checker.verify(&create_fixture(2), &first).unwrap();
}

#[test]
fn test_missing_id_is_not_found() {
    let mut checker = checker_with(&[0]);

    let err = checker.fetch_by_id::<AllTypes>(42).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.table(), Some("AllTypes"));
}

#[test]
fn test_shared_narrow_value_is_ambiguous() {
    // Given: Seeds 0 and 256, whose SByte and Byte values wrap to the same number
    let mut checker = checker_with(&[0, 256]);
    let value = create_fixture(0).column_value(col::SBYTE).unwrap();
    assert_eq!(value, create_fixture(256).column_value(col::SBYTE).unwrap());

    // When: Looking up by SByte
    let err = checker
        .fetch_by_field_equality::<AllTypes>(col::SBYTE, value)
        .unwrap_err();

    // Then: The lookup refuses to pick one
    assert_eq!(err.kind(), ExErrorKind::AmbiguousResult);
}

#[test]
fn test_fetch_first_on_empty_match_is_not_found() {
    let mut checker = checker_with(&[1]);

    let err = checker
        .fetch_first::<AllTypes>(&Predicate::eq(col::BOOL, true), &Order::asc(col::ID))
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_update_replaces_every_field() {
    // Given: A row keyed Id=0 holding the seed-0 values
    let mut checker = checker();
    checker.recreate::<AllTypes>().unwrap();
    let mut original = create_fixture(0);
    original.id = 0;
    checker.persist(&[original]).unwrap();

    // When: Updating with seed 3 re-keyed to Id=0
    let mut updated = create_fixture(3);
    updated.id = 0;
    checker.update(&updated).unwrap();

    // Then: Id 0 holds the seed-3 values entirely, not a merge
    let back = checker.fetch_by_id::<AllTypes>(0).unwrap();
    assert!(
        updated.structural_equals(&back),
        "{:?}",
        updated.first_mismatch(&back)
    );
}

#[test]
fn test_update_is_idempotent() {
    // Given: A persisted fixture
    let mut checker = checker_with(&[4]);
    let mut updated = create_fixture(9);
    updated.id = create_fixture(4).id;

    // When: Applying the same update twice
    checker.update(&updated).unwrap();
    let once = checker.fetch_by_id::<AllTypes>(updated.id).unwrap();
    checker.update(&updated).unwrap();
    let twice = checker.fetch_by_id::<AllTypes>(updated.id).unwrap();

    // Then: The stored record does not change between applications
    assert!(once.structural_equals(&twice));
    assert!(updated.structural_equals(&twice));
}

#[test]
fn test_update_of_missing_key_is_not_found() {
    let mut checker = checker_with(&[0]);
    let mut ghost = create_fixture(5);
    ghost.id = 999;

    let err = checker.update(&ghost).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.op(), Some("update"));
}

#[test]
fn test_partial_update_touches_only_named_fields() {
    // Given: The seed-0 fixture persisted
    let mut checker = checker_with(&[0]);
    let stored = create_fixture(0);

    // When: Updating only String and Double from a different record with the same key
    let mut source = create_fixture(7);
    source.id = stored.id;
    checker
        .update_only(&source, &[col::STRING, col::DOUBLE])
        .unwrap();

    // Then: Those two fields changed and nothing else did
    let back = checker.fetch_by_id::<AllTypes>(stored.id).unwrap();
    let mut expected = stored.clone();
    expected.string = source.string.clone();
    expected.double = source.double;
    checker.verify(&expected, &back).unwrap();
}

#[test]
fn test_partial_update_rejects_primary_key() {
    let mut checker = checker_with(&[0]);
    let record = create_fixture(0);

    let err = checker.update_only(&record, &[col::ID]).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_verify_reports_field_and_values() {
    let checker = checker();
    let expected = create_fixture(1);
    let mut actual = expected.clone();
    actual.string = "Tampered".to_string();

    let err = checker.verify(&expected, &actual).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::FieldMismatch);
    assert_eq!(err.field(), Some("String"));
    assert_eq!(err.expected(), Some("\"String1\""));
    assert_eq!(err.actual(), Some("\"Tampered\""));
}

#[test]
fn test_verify_numeric_difference_is_precision_loss() {
    let checker = checker();
    let expected = create_fixture(1);
    let mut actual = expected.clone();
    actual.double += 1e-9;

    let err = checker.verify(&expected, &actual).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::PrecisionLoss);
    assert_eq!(err.field(), Some("Double"));
}

#[test]
fn test_verify_nested_path_keeps_collection_index() {
    let checker = checker();
    let expected = create_fixture(1);
    let mut actual = expected.clone();
    actual.sub_types[1].name = "Other".to_string();

    let err = checker.verify(&expected, &actual).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::FieldMismatch);
    assert_eq!(err.field(), Some("SubTypes[1].Name"));
}

#[test]
fn test_over_length_custom_text_rejected_before_write() {
    // Given: A record whose CustomText exceeds its declared bound
    let mut checker = checker();
    checker.recreate::<AllTypes>().unwrap();
    let mut record = create_fixture(0);
    record.custom_text = "x".repeat(101);

    // When: Persisting it
    let err = checker.persist(&[record]).unwrap_err();

    // Then: Nothing was written
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(err.field(), Some("CustomText"));
    assert!(checker
        .fetch_where::<AllTypes>(&Predicate::All, None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_duplicate_primary_key_is_constraint_violation() {
    let mut checker = checker_with(&[0]);

    let err = checker.persist(&[create_fixture(0)]).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
}

#[test]
fn test_failed_batch_rolls_back() {
    // Given: A batch whose second row collides with the first
    let mut checker = checker();
    checker.recreate::<AllTypes>().unwrap();
    let batch = [create_fixture(0), create_fixture(0)];

    // When: Persisting it
    assert!(checker.persist(&batch).is_err());

    // Then: Neither row remains
    let rows = checker
        .fetch_where::<AllTypes>(&Predicate::All, None)
        .unwrap();
    assert!(rows.is_empty());
}
