//! ormcheck core - round-trip fidelity model
//!
//! This crate holds everything that does not touch a database connection:
//! - `AllTypes` and the auxiliary record types with their table schemas
//! - Deterministic seed fixtures
//! - Column encodings, including the JSV text form for collections
//! - Structural equality with first-mismatch diagnostics
//! - Dialect capability flags and DDL rendering for seven dialects
//! - Harness configuration, error facility, and logging facility

pub mod codec;
pub mod config;
pub mod dialect;
pub mod equality;
pub mod errors;
pub mod fixture;
pub mod logging_facility;
pub mod model;
pub mod schema;
pub mod value;

// Used by the logging macros
pub use ormcheck_core_types as core_types;

// Re-export commonly used types
pub use config::HarnessConfig;
pub use dialect::{Capabilities, Dialect};
pub use equality::{structural_equals, FieldMismatch, StructuralEq};
pub use errors::{ExError, ExErrorKind, Result};
pub use fixture::create_fixture;
pub use model::AllTypes;
pub use schema::{Table, TableSchema};
pub use value::{Row, SqlValue};
