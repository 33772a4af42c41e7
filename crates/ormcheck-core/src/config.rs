//! Harness configuration
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! `ORMCHECK_*` environment variables, and finally command-line flags applied
//! by the caller.
//!
//! ```toml
//! dialect = "sqlite"
//! connection = "/tmp/ormcheck.sqlite"
//! rows = 3
//! log_profile = "production"
//! ```

use crate::dialect::Dialect;
use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_DIALECT: &str = "ORMCHECK_DIALECT";
pub const ENV_CONNECTION: &str = "ORMCHECK_CONNECTION";
pub const ENV_ROWS: &str = "ORMCHECK_ROWS";

/// Host of the SQL Server build database
pub const ENV_CI_HOST: &str = "CI_HOST";

pub const SQLITE_MEMORY_DB: &str = ":memory:";

const DEFAULT_ROWS: i32 = 3;

const POSTGRES_CONNECTION: &str = concat!(
    "Server=localhost;Port=5432;User Id=test;Password=test;Database=test;",
    "Pooling=true;MinPoolSize=0;MaxPoolSize=200"
);
const ORACLE_CONNECTION: &str = "Data Source=localhost:1521/ormlite;User ID=test;Password=test";
const FIREBIRD_CONNECTION: &str = concat!(
    "User=SYSDBA;Password=masterkey;Database=localhost:App_Data/TEST.FDB;",
    "DataSource=localhost;Dialect=3;charset=ISO8859_1;MinPoolSize=0;MaxPoolSize=100;"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub dialect: Dialect,
    /// Explicit connection string; the dialect default is used when absent
    pub connection: Option<String>,
    /// Number of fixture rows per round-trip scenario
    pub rows: i32,
    pub log_profile: Profile,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            connection: None,
            rows: DEFAULT_ROWS,
            log_profile: Profile::Development,
        }
    }
}

fn config_error(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op(op)
        .with_message(message)
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| config_error("parse_config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text).map_err(|e| {
            let message = format!("invalid config file {}", path.display());
            config_error("load_config", message).with_source(e)
        })
    }

    /// Apply `ORMCHECK_*` overrides from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dialect) = lookup(ENV_DIALECT) {
            self.dialect = dialect.parse()?;
        }
        if let Some(connection) = lookup(ENV_CONNECTION) {
            self.connection = Some(connection);
        }
        if let Some(rows) = lookup(ENV_ROWS) {
            self.rows = rows.trim().parse().map_err(|_| {
                config_error(
                    "apply_env",
                    format!("{} must be an integer, got '{}'", ENV_ROWS, rows),
                )
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows < 1 {
            return Err(config_error(
                "validate_config",
                format!("rows must be at least 1, got {}", self.rows),
            ));
        }
        Ok(())
    }

    /// Connection string to use: the explicit one, else the dialect default
    pub fn connection_string(&self) -> String {
        self.connection.clone().unwrap_or_else(|| {
            default_connection(self.dialect, std::env::var(ENV_CI_HOST).ok().as_deref())
        })
    }
}

/// Default connection string per dialect
///
/// SQL Server points at the CI build database on `ci_host`.
pub fn default_connection(dialect: Dialect, ci_host: Option<&str>) -> String {
    match dialect {
        Dialect::Sqlite => SQLITE_MEMORY_DB.to_string(),
        Dialect::SqlServer => format!(
            "Server={};Database=test;User Id=test;Password=test;",
            ci_host.unwrap_or_default()
        ),
        Dialect::SqlServerMdf => "App_Data/Database1.mdf".to_string(),
        Dialect::PostgreSql => POSTGRES_CONNECTION.to_string(),
        Dialect::MySql => "Server=localhost;Database=test;UID=root;Password=test".to_string(),
        Dialect::Oracle => ORACLE_CONNECTION.to_string(),
        Dialect::Firebird => FIREBIRD_CONNECTION.to_string(),
    }
}
