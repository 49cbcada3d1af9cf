//! Error types for the core data model.
//!
//! Covers field-value contract violations, row decoding failures, and
//! resource-address parsing. Storage-engine failures live in the engine
//! binding crate, not here.

use thiserror::Error;

/// Errors raised by schema, record, and address operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Null was stored into (or decoded for) a non-nullable field.
    #[error("cannot store null in non-nullable field '{0}'")]
    NullNotAllowed(String),

    /// A value's type tag does not match the field's declared type.
    #[error("type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A stored enum name is not a member of the declared value set.
    #[error("unknown enum member '{value}' for field '{field}'")]
    UnknownEnumMember { field: String, value: String },

    /// No field with the given name exists in the schema.
    #[error("no field named '{0}'")]
    UnknownField(String),

    /// A row has fewer columns than the projection being decoded.
    #[error("row too narrow: field '{field}' expects column {column}, row has {width} columns")]
    MissingColumn {
        field: String,
        column: usize,
        width: usize,
    },

    /// A stored epoch-millisecond value does not map to a valid instant.
    #[error("timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    /// A resource address is malformed or does not match the expected
    /// namespace.
    #[error("invalid resource address: {0}")]
    InvalidAddress(String),
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
