#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for the scenario suite
// Covers: each scenario on in-memory SQLite, the suite report, unsupported dialects

use ormcheck_core::config::HarnessConfig;
use ormcheck_core::core_types::schema::{EVENT_END, EVENT_START, FIELD_DIALECT, FIELD_RUN_ID};
use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::ExErrorKind;
use ormcheck_core::logging_facility::init_test_capture;
use ormcheck_core::model::flags::col as flags_col;
use ormcheck_core::model::guid_list::col as guid_col;
use ormcheck_core::model::{TypeWithFlagsEnum, WithAListOfGuids};
use ormcheck_core::SqlValue;
use ormcheck_store::scenarios::{self, Outcome, GUID_LIST_LITERAL, SCENARIO_NAMES};
use ormcheck_store::{run_all, RoundTripChecker, SqliteBackend};

fn checker() -> RoundTripChecker {
    RoundTripChecker::new(Box::new(SqliteBackend::open_in_memory().unwrap()))
}

#[test]
fn test_all_types_scenario_passes() {
    let mut checker = checker();
    scenarios::insert_update_and_select_all_types(&mut checker, 3).unwrap();
}

#[test]
fn test_all_types_scenario_with_wrapping_narrow_fields() {
    // Given: More rows than SByte/Byte can tell apart
    let mut checker = checker();

    // Then: Shared values are expected to be ambiguous and the scenario still passes
    scenarios::insert_update_and_select_all_types(&mut checker, 300).unwrap();
}

#[test]
fn test_all_types_scenario_rejects_zero_rows() {
    let mut checker = checker();
    let err = scenarios::insert_update_and_select_all_types(&mut checker, 0).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_float_query_scenario_passes() {
    let mut checker = checker();
    scenarios::query_float_in_alternate_culture(&mut checker).unwrap();
    assert!(checker
        .last_sql()
        .unwrap()
        .contains("round(\"Height\",3)=?"));
}

#[test]
fn test_composite_index_scenario_passes_twice() {
    // Given/When: The scenario runs twice on one connection
    let mut checker = checker();
    scenarios::create_table_with_composite_indexes(&mut checker).unwrap();

    // Then: Dropping in dependency order lets it start over
    scenarios::create_table_with_composite_indexes(&mut checker).unwrap();
}

#[test]
fn test_flags_scenario_stores_exact_integer() {
    // Given: The flags scenario has run
    let mut checker = checker();
    scenarios::updates_enum_flags_with_int_value(&mut checker).unwrap();

    // Then: Stored flags are the written integers, in insertion order
    let stored = checker
        .select_column::<TypeWithFlagsEnum>(flags_col::FLAGS)
        .unwrap();
    assert_eq!(
        stored,
        vec![
            SqlValue::Integer(2),
            SqlValue::Integer(1),
            SqlValue::Integer(1)
        ]
    );
}

#[test]
fn test_guid_list_scenario_stores_literal() {
    let mut checker = checker();
    scenarios::lists_of_guids_are_formatted_correctly(&mut checker).unwrap();

    let stored = checker
        .select_column::<WithAListOfGuids>(guid_col::THE_GUIDS)
        .unwrap();
    assert_eq!(stored, vec![SqlValue::Text(GUID_LIST_LITERAL.to_string())]);
}

#[test]
fn test_run_all_passes_on_sqlite() {
    // Given: The default configuration (in-memory SQLite, 3 rows)
    let config = HarnessConfig::default();

    // When: Running the suite
    let report = run_all(&config).unwrap();

    // Then: Every scenario passed
    assert_eq!(report.results.len(), SCENARIO_NAMES.len());
    assert_eq!(
        report.passed(),
        SCENARIO_NAMES.len(),
        "{:#?}",
        report.results
    );
    assert!(report.is_success());
    assert!(!report.run_id.is_empty());
}

#[test]
fn test_run_all_logs_dialect_under_its_run_id() {
    // Given: Test capture installed
    let capture = init_test_capture();

    // When: Running the suite
    let report = run_all(&HarnessConfig::default()).unwrap();

    // Then: The suite's start and end events carry the report's run id and dialect
    let ours = |event: &str| {
        capture
            .find("run_all", event)
            .into_iter()
            .filter(|e| e.field(FIELD_RUN_ID) == Some(report.run_id.as_str()))
            .collect::<Vec<_>>()
    };
    let started = ours(EVENT_START);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].field(FIELD_DIALECT), Some("sqlite"));
    assert_eq!(ours(EVENT_END).len(), 1);
}

#[test]
fn test_run_all_skips_unsupported_dialect() {
    // Given: A dialect with no driver here
    let config = HarnessConfig {
        dialect: Dialect::PostgreSql,
        ..HarnessConfig::default()
    };

    // When: Running the suite
    let report = run_all(&config).unwrap();

    // Then: Every scenario is skipped, none failed
    assert_eq!(report.skipped(), SCENARIO_NAMES.len());
    assert!(report.is_success());
    assert!(report
        .results
        .iter()
        .all(|r| r.outcome == Outcome::Skipped));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["dialect"], "postgresql");
    assert_eq!(json["results"][0]["outcome"], "skipped");
}

#[test]
fn test_run_all_rejects_invalid_config() {
    let config = HarnessConfig {
        rows: 0,
        ..HarnessConfig::default()
    };

    let err = run_all(&config).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Config);
}
