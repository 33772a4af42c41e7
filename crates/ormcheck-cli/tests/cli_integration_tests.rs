//! CLI integration tests
//!
//! These tests run the built `ormcheck` binary and check its exit status and
//! stdout for the `run` and `ddl` subcommands.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn ormcheck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ormcheck"))
        .args(args)
        .env_remove("ORMCHECK_DIALECT")
        .env_remove("ORMCHECK_CONNECTION")
        .env_remove("ORMCHECK_ROWS")
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_run_json_reports_every_scenario_passed() {
    // When: `ormcheck run --json` against the default in-memory SQLite
    let output = ormcheck(&["run", "--json"]);

    // Then: Exit 0 and a JSON report on stdout
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dialect"], "sqlite");
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r["outcome"] == "passed"));
}

#[test]
fn test_run_from_config_file_against_database_file() {
    // Given: A config file pointing at a scratch database file
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ormcheck.sqlite");
    let config_path = temp_dir.path().join("ormcheck.toml");
    fs::write(
        &config_path,
        format!(
            "dialect = \"sqlite\"\nconnection = \"{}\"\nrows = 4\n",
            db_path.display()
        ),
    )
    .unwrap();

    // When: Running with that config
    let output = ormcheck(&["run", "--config", config_path.to_str().unwrap()]);

    // Then: The summary reports success and the file now exists
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("5 passed, 0 failed, 0 skipped"),
        "{}",
        stdout
    );
    assert!(db_path.exists());
}

#[test]
fn test_run_unsupported_dialect_skips() {
    let output = ormcheck(&["run", "--dialect", "oracle", "--json"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dialect"], "oracle");
    assert!(report["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["outcome"] == "skipped"));
}

#[test]
fn test_run_rejects_unknown_dialect() {
    let output = ormcheck(&["run", "--dialect", "dbase"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown dialect"));
}

#[test]
fn test_run_rejects_zero_rows() {
    let output = ormcheck(&["run", "--rows", "0"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_CONFIG"));
}

#[test]
fn test_ddl_postgres_uses_serial_and_composite_index() {
    let output = ormcheck(&["ddl", "--dialect", "postgres"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CREATE TABLE \"AllTypes\""));
    assert!(stdout.contains("\"Id\" SERIAL PRIMARY KEY"));
    assert!(stdout.contains("CREATE UNIQUE INDEX"));
}

#[test]
fn test_ddl_single_table() {
    let output = ormcheck(&["ddl", "--table", "TypeWithFlagsEnum"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CREATE TABLE \"TypeWithFlagsEnum\""));
    assert!(!stdout.contains("\"AllTypes\""));
}

#[test]
fn test_ddl_unknown_table_fails() {
    let output = ormcheck(&["ddl", "--table", "Nope"]);

    assert!(!output.status.success());
}
