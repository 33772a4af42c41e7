//! Run command
//!
//! Usage: ormcheck run [--config <FILE>] [--dialect <NAME>] [--connection <STR>]
//!                     [--rows <N>] [--json]

use clap::Args;
use ormcheck_core::config::HarnessConfig;
use ormcheck_core::logging_facility;
use ormcheck_store::scenarios::{run_all, Outcome, ScenarioReport};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dialect to run against (overrides config and environment)
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Connection string (overrides config and environment)
    #[arg(long)]
    pub connection: Option<String>,

    /// Fixture rows per round-trip scenario
    #[arg(short, long)]
    pub rows: Option<i32>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Defaults, then file, then environment, then flags
fn resolve_config(args: &RunArgs) -> Result<HarnessConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    }
    .with_env()?;

    if let Some(dialect) = &args.dialect {
        config.dialect = dialect.parse()?;
    }
    if let Some(connection) = &args.connection {
        config.connection = Some(connection.clone());
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    config.validate()?;
    Ok(config)
}

fn print_summary(report: &ScenarioReport) {
    println!("ormcheck run {} ({})", report.run_id, report.dialect);
    for result in &report.results {
        let mark = match result.outcome {
            Outcome::Passed => "✓",
            Outcome::Failed => "✗",
            Outcome::Skipped => "-",
        };
        println!("{} {}", mark, result.name);
        if let Some(message) = &result.message {
            println!("    {}", message);
        }
    }
    println!(
        "{} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
}

/// Execute run command
pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;
    logging_facility::init(config.log_profile);
    tracing::debug!(dialect = %config.dialect, rows = config.rows, "configuration resolved");

    let report = run_all(&config)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }

    if !report.is_success() {
        return Err(format!("{} scenario(s) failed", report.failed()).into());
    }
    Ok(())
}
