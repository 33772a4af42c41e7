//! Error facility for the round-trip checker
//!
//! `ExError` is the single structured error carried across crate boundaries.
//! Leaf modules with their own failure taxonomy (the text codec) define a
//! `thiserror` enum and convert into `ExError` at the boundary.

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling
/// and for asserting on failures in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,
    AmbiguousResult,

    // Mapping
    Schema,
    PrecisionLoss,
    FieldMismatch,
    InvalidInput,
    ConstraintViolation,

    // Backend selection
    UnsupportedBackend,
    Config,

    // Integration/IO
    Serialization,
    Persistence,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousResult => "ERR_AMBIGUOUS_RESULT",
            ExErrorKind::Schema => "ERR_SCHEMA",
            ExErrorKind::PrecisionLoss => "ERR_PRECISION_LOSS",
            ExErrorKind::FieldMismatch => "ERR_FIELD_MISMATCH",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::UnsupportedBackend => "ERR_UNSUPPORTED_BACKEND",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the context needed to diagnose a failed
/// round trip without re-running it: which table and field, and the expected
/// and actual renderings of the value.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    field: Option<String>,
    expected: Option<String>,
    actual: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            field: None,
            expected: None,
            actual: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add field (column or field path) context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add the rendering of the value that was written
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Add the rendering of the value that was read back
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the expected value rendering, if any
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Get the actual value rendering, if any
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(expected) = &self.expected {
            write!(f, "\n    expected: {}", expected)?;
        }
        if let Some(actual) = &self.actual {
            write!(f, "\n    actual:   {}", actual)?;
        }
        if let Some(source) = &self.source {
            write!(f, "\n  caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Shorthand for a lookup that matched no rows
pub fn not_found(table: &str, what: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_table(table)
        .with_message(format!("no row matched {}", what))
}

/// Shorthand for a lookup that expected one row but matched several
pub fn ambiguous(table: &str, what: impl std::fmt::Display, matches: usize) -> ExError {
    ExError::new(ExErrorKind::AmbiguousResult)
        .with_table(table)
        .with_message(format!(
            "{} rows matched {}, expected exactly one",
            matches, what
        ))
}

/// Shorthand for a column that is missing or holds the wrong storage class
pub fn schema_error(column: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Schema)
        .with_field(column)
        .with_message(reason)
}
