//! Scenario suite
//!
//! Each scenario drives a [`RoundTripChecker`] through one end-to-end
//! fidelity check and returns the first failure. `run_all` runs the whole
//! suite against the configured backend and summarizes it in a
//! [`ScenarioReport`].

use crate::backend::{Order, Predicate};
use crate::checker::RoundTripChecker;
use crate::errors::{check_failed, Result};
use crate::sqlite::open_backend;
use ormcheck_core::config::HarnessConfig;
use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::{ExError, ExErrorKind};
use ormcheck_core::fixture::{create_fixture, create_fixtures};
use ormcheck_core::model::{
    all_types, flags, point, user_auth, AllTypes, Company, FlagsEnum, Point, TypeWithFlagsEnum,
    UserAuth, WithAListOfGuids,
};
use ormcheck_core::schema::Table;
use ormcheck_core::value::SqlValue;
use ormcheck_core::{log_op_end, log_op_error, log_op_start};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

pub const ALL_TYPES: &str = "insert_update_and_select_all_types";
pub const FLOAT_QUERY: &str = "query_float_in_alternate_culture";
pub const COMPOSITE_INDEXES: &str = "create_table_with_composite_indexes";
pub const FLAGS_UPDATE: &str = "updates_enum_flags_with_int_value";
pub const GUID_LIST: &str = "lists_of_guids_are_formatted_correctly";

/// Every scenario, in run order
pub const SCENARIO_NAMES: [&str; 5] = [
    ALL_TYPES,
    FLOAT_QUERY,
    COMPOSITE_INDEXES,
    FLAGS_UPDATE,
    GUID_LIST,
];

/// Text the GUID sequence must be stored as
pub const GUID_LIST_LITERAL: &str =
    "[18176030-7a1c-4288-82df-a52f71832381,017f986b-f7be-4b6f-b978-ff05fba3b0aa]";

const GUID_ONE: Uuid = Uuid::from_u128(0x32cb0acb_db43_4061_a6aa_7f4902a7002a);
const GUID_TWO: Uuid = Uuid::from_u128(0x13083231_b005_4ff4_ab62_41bdc7f50a4d);
const LISTED_GUIDS: [Uuid; 2] = [
    Uuid::from_u128(0x18176030_7a1c_4288_82df_a52f71832381),
    Uuid::from_u128(0x017f986b_f7be_4b6f_b978_ff05fba3b0aa),
];

const FLOAT_PROBE: f32 = 1.123;

fn narrow_id(op: &str, id: i64) -> Result<i32> {
    i32::try_from(id).map_err(|_| {
        ExError::new(ExErrorKind::Internal)
            .with_op(op.to_string())
            .with_message(format!("assigned id {} does not fit i32", id))
    })
}

/// Insert seeds `0..rows`, read them back every way the harness can, then
/// replace each with seed `rows + i` and read again
///
/// Update records take over the id of the persisted row they replace.
/// Equality lookups on a value shared by several fixtures (narrow integer
/// columns wrap once `rows` is large) must be reported as ambiguous.
pub fn insert_update_and_select_all_types(checker: &mut RoundTripChecker, rows: i32) -> Result<()> {
    if rows < 1 {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op(ALL_TYPES)
            .with_message(format!("rows must be at least 1, got {}", rows)));
    }

    checker.recreate::<AllTypes>()?;
    let fixtures = create_fixtures(rows);
    checker.persist(&fixtures)?;

    let last = create_fixture(rows - 1);
    checker.verify_round_trip(&last)?;

    for field in AllTypes::EQUALITY_COLUMNS {
        let value = last.column_value(field)?;
        let mut sharing = 0;
        for fixture in &fixtures {
            if fixture.column_value(field)? == value {
                sharing += 1;
            }
        }

        match checker.fetch_by_field_equality::<AllTypes>(field, value) {
            Ok(found) if sharing == 1 => checker.verify(&last, &found)?,
            Ok(_) => {
                return Err(check_failed(
                    ALL_TYPES,
                    format!(
                        "{} fixtures share {}, but the lookup matched one row",
                        sharing, field
                    ),
                ))
            }
            Err(err) if err.kind() == ExErrorKind::AmbiguousResult && sharing > 1 => {}
            Err(err) => return Err(err.with_field(*field)),
        }
    }

    let newest_with_flag = checker.fetch_first::<AllTypes>(
        &Predicate::eq(all_types::col::BOOL, last.boolean),
        &Order::desc(all_types::col::ID),
    )?;
    checker.verify(&last, &newest_with_flag)?;

    for (i, persisted) in fixtures.iter().enumerate() {
        let mut updated = create_fixture(rows.wrapping_add(i as i32));
        updated.id = persisted.id;
        checker.update(&updated)?;
        checker.verify_round_trip(&updated)?;
    }
    Ok(())
}

/// Filter a float column by a rounded literal
pub fn query_float_in_alternate_culture(checker: &mut RoundTripChecker) -> Result<()> {
    checker.recreate::<Point>()?;

    let mut expected = Point {
        id: 0,
        width: 4,
        height: FLOAT_PROBE,
        top: 3.456,
        left: Decimal::new(2345, 3),
    };
    let id = checker.insert(&expected)?;
    expected.id = narrow_id(FLOAT_QUERY, id)?;

    let dialect = checker.backend().dialect();
    let filter = format!("{}=?", dialect.round3(point::col::HEIGHT));
    let points = checker.select_where_sql::<Point>(&filter, &[SqlValue::Real(1.123)])?;

    let Some(found) = points.first() else {
        let message = format!("no Point matched {}", filter);
        return Err(check_failed(FLOAT_QUERY, message));
    };
    checker.verify(&expected, found)
}

/// Unique `(CompanyId, UserName)` index and backend-assigned ids
pub fn create_table_with_composite_indexes(checker: &mut RoundTripChecker) -> Result<()> {
    checker.drop_table::<UserAuth>()?;
    checker.drop_table::<Company>()?;
    checker.create_table::<Company>()?;
    checker.create_table::<UserAuth>()?;

    checker.insert(&Company {
        id: 1,
        name: "Acme".to_string(),
    })?;

    let user = |name: &str| UserAuth {
        id: 0,
        company_id: 1,
        user_name: name.to_string(),
        email: format!("{}@acme.test", name),
    };

    let mut alice = user("alice");
    let mut bob = user("bob");
    alice.id = narrow_id(COMPOSITE_INDEXES, checker.insert(&alice)?)?;
    bob.id = narrow_id(COMPOSITE_INDEXES, checker.insert(&bob)?)?;
    if bob.id <= alice.id {
        return Err(check_failed(
            COMPOSITE_INDEXES,
            format!("ids not increasing: {} then {}", alice.id, bob.id),
        ));
    }

    match checker.insert(&user("alice")) {
        Ok(id) => {
            return Err(check_failed(
                COMPOSITE_INDEXES,
                format!("duplicate (CompanyId, UserName) accepted as id {}", id),
            ))
        }
        Err(err) if err.kind() == ExErrorKind::ConstraintViolation => {}
        Err(err) => return Err(err),
    }

    let stored = checker.fetch_by_id::<UserAuth>(alice.id)?;
    checker.verify(&alice, &stored)?;
    let by_name = checker.fetch_by_field_equality::<UserAuth>(
        user_auth::col::USER_NAME,
        SqlValue::from("bob"),
    )?;
    checker.verify(&bob, &by_name)
}

/// Flags are written as their integer value, never merged with what is stored
pub fn updates_enum_flags_with_int_value(checker: &mut RoundTripChecker) -> Result<()> {
    checker.recreate::<TypeWithFlagsEnum>()?;
    checker.persist(&[
        TypeWithFlagsEnum {
            id: 1,
            flags: FlagsEnum::FLAG_ONE,
        },
        TypeWithFlagsEnum {
            id: 2,
            flags: FlagsEnum::FLAG_TWO,
        },
        TypeWithFlagsEnum {
            id: 3,
            flags: FlagsEnum::FLAG_ONE | FlagsEnum::FLAG_TWO,
        },
    ])?;

    let updated = TypeWithFlagsEnum {
        id: 1,
        flags: FlagsEnum::FLAG_THREE,
    };
    checker.update(&updated)?;

    let binding = format!("={}", checker.backend().dialect().param(flags::col::FLAGS));
    let sql = checker.last_sql().unwrap_or_default().to_string();
    if !sql.contains(&binding) {
        return Err(check_failed(
            FLAGS_UPDATE,
            format!("update does not bind {}: {}", binding, sql),
        ));
    }
    checker.verify_round_trip(&updated)?;

    checker.update_only(&updated, &[flags::col::FLAGS])?;
    let stored = checker.fetch_by_id::<TypeWithFlagsEnum>(updated.id)?;
    if stored.flags.bits() != FlagsEnum::FLAG_THREE.bits() {
        return Err(ExError::new(ExErrorKind::FieldMismatch)
            .with_op(FLAGS_UPDATE)
            .with_table("TypeWithFlagsEnum")
            .with_field(flags::col::FLAGS)
            .with_expected(FlagsEnum::FLAG_THREE.bits().to_string())
            .with_actual(stored.flags.bits().to_string()));
    }
    Ok(())
}

/// A GUID sequence is stored as one bracketed, comma-joined text value
pub fn lists_of_guids_are_formatted_correctly(checker: &mut RoundTripChecker) -> Result<()> {
    use ormcheck_core::model::guid_list::col;

    checker.recreate::<WithAListOfGuids>()?;
    checker.insert(&WithAListOfGuids {
        guid_one: GUID_ONE,
        guid_two: GUID_TWO,
        the_guids: LISTED_GUIDS.to_vec(),
    })?;

    let expectations = [
        (col::GUID_ONE, GUID_ONE.to_string()),
        (col::GUID_TWO, GUID_TWO.to_string()),
        (col::THE_GUIDS, GUID_LIST_LITERAL.to_string()),
    ];
    for (column, expected) in expectations {
        let stored = checker.select_column::<WithAListOfGuids>(column)?;
        match stored.first() {
            Some(SqlValue::Text(actual)) if *actual == expected => {}
            other => {
                return Err(ExError::new(ExErrorKind::FieldMismatch)
                    .with_op(GUID_LIST)
                    .with_table("WithAListOfGuids")
                    .with_field(column)
                    .with_expected(expected)
                    .with_actual(format!("{:?}", other)))
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of one suite run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub run_id: String,
    pub dialect: Dialect,
    pub results: Vec<ScenarioResult>,
}

impl ScenarioReport {
    pub fn new(run_id: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            run_id: run_id.into(),
            dialect,
            results: Vec::new(),
        }
    }

    /// Record a scenario's result
    pub fn record(&mut self, name: &str, result: Result<()>) {
        let entry = match result {
            Ok(()) => ScenarioResult {
                name: name.to_string(),
                outcome: Outcome::Passed,
                error_code: None,
                message: None,
            },
            Err(err) => ScenarioResult {
                name: name.to_string(),
                outcome: Outcome::Failed,
                error_code: Some(err.code().to_string()),
                message: Some(err.to_string()),
            },
        };
        self.results.push(entry);
    }

    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.results.push(ScenarioResult {
            name: name.to_string(),
            outcome: Outcome::Skipped,
            error_code: None,
            message: Some(reason.into()),
        });
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("report_to_json")
                .with_message(e.to_string())
        })
    }
}

/// Run every scenario against the configured backend
///
/// A dialect without a driver yields a report with every scenario skipped.
/// Scenario failures are recorded, not returned.
pub fn run_all(config: &HarnessConfig) -> Result<ScenarioReport> {
    config.validate()?;

    let backend = match open_backend(config) {
        Ok(backend) => backend,
        Err(err) if err.kind() == ExErrorKind::UnsupportedBackend => {
            let mut report = ScenarioReport::new(String::new(), config.dialect);
            for name in SCENARIO_NAMES {
                report.skip(name, err.message());
            }
            tracing::warn!(
                dialect = %config.dialect,
                "backend unsupported, every scenario skipped"
            );
            return Ok(report);
        }
        Err(err) => return Err(err),
    };

    let mut checker = RoundTripChecker::new(backend);
    let mut report = ScenarioReport::new(checker.run_id().as_str(), config.dialect);

    log_op_start!(
        "run_all",
        dialect = %config.dialect,
        rows = config.rows,
        run_id = checker.run_id().as_str()
    );
    let start = Instant::now();

    report.record(
        ALL_TYPES,
        insert_update_and_select_all_types(&mut checker, config.rows),
    );
    report.record(FLOAT_QUERY, query_float_in_alternate_culture(&mut checker));
    report.record(
        COMPOSITE_INDEXES,
        create_table_with_composite_indexes(&mut checker),
    );
    report.record(
        FLAGS_UPDATE,
        updates_enum_flags_with_int_value(&mut checker),
    );
    report.record(
        GUID_LIST,
        lists_of_guids_are_formatted_correctly(&mut checker),
    );

    let duration_ms = start.elapsed().as_millis() as u64;
    if report.is_success() {
        log_op_end!(
            "run_all",
            duration_ms = duration_ms,
            passed = report.passed(),
            run_id = checker.run_id().as_str()
        );
    } else {
        let err = check_failed("run_all", format!("{} scenarios failed", report.failed()));
        log_op_error!(
            "run_all",
            &err,
            duration_ms = duration_ms,
            failed = report.failed(),
            run_id = checker.run_id().as_str()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_json() {
        let mut report = ScenarioReport::new("run-1", Dialect::Sqlite);
        report.record(ALL_TYPES, Ok(()));
        report.record(
            FLOAT_QUERY,
            Err(ExError::new(ExErrorKind::NotFound).with_message("no Point")),
        );
        report.skip(GUID_LIST, "not run");

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["dialect"], "sqlite");
        assert_eq!(json["results"][0]["outcome"], "passed");
        assert!(json["results"][0].get("error_code").is_none());
        assert_eq!(json["results"][1]["error_code"], "ERR_NOT_FOUND");
        assert_eq!(json["results"][2]["outcome"], "skipped");
    }

    #[test]
    fn test_listed_guids_match_literal() {
        let rendered = format!("[{},{}]", LISTED_GUIDS[0], LISTED_GUIDS[1]);
        assert_eq!(rendered, GUID_LIST_LITERAL);
    }
}
