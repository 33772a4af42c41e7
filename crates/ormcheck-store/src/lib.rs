//! ormcheck store - backend execution for the round-trip checker
//!
//! Provides:
//! - The `Backend` boundary and its SQLite implementation
//! - Named-parameter statement builders
//! - `RoundTripChecker`: typed persist/fetch/update with verification
//! - The scenario suite and its JSON report

pub mod backend;
pub mod checker;
pub mod db;
pub mod errors;
pub mod scenarios;
pub mod sql;
pub mod sqlite;

// Re-export key types
pub use backend::{Backend, Order, Predicate};
pub use checker::RoundTripChecker;
pub use errors::Result;
pub use scenarios::{run_all, Outcome, ScenarioReport};
pub use sqlite::{open_backend, SqliteBackend};
