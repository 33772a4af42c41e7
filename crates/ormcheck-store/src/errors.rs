//! Error handling for ormcheck-store
//!
//! Wraps ormcheck-core ExError with store-specific helpers

use ormcheck_core::dialect::Dialect;
use ormcheck_core::errors::{ExError, ExErrorKind};
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
///
/// Constraint failures (UNIQUE, FOREIGN KEY, NOT NULL) get their own kind so
/// callers can tell a rejected row from a broken connection.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// A dialect this workspace can render DDL for but cannot connect to
pub fn unsupported_backend(dialect: Dialect) -> ExError {
    ExError::new(ExErrorKind::UnsupportedBackend)
        .with_op("open_backend")
        .with_message(format!(
            "no driver for dialect '{}'; only sqlite is executable",
            dialect
        ))
}

/// A scenario assertion that did not hold
pub fn check_failed(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::FieldMismatch)
        .with_op(op.to_string())
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failure_has_own_kind() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn.execute_batch("INSERT INTO t VALUES (1);").unwrap_err();

        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_other_failures_are_persistence() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute_batch("SELECT * FROM missing;").unwrap_err();

        let err = from_rusqlite(err);
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.op(), Some("sqlite"));
    }
}
