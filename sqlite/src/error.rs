//! Error types for SQLite-backed storage operations.
//!
//! Provides a unified error type covering engine failures, CRUD contract
//! violations, gateway address misuse, and migration failures.

use rowkit_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the SQLite storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failure, surfaced verbatim.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data-model contract violation (field values, addresses, decoding).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// File I/O failure while loading scripts or copying seed databases.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A point operation matched a number of rows other than exactly one.
    #[error("expected exactly one row with id {id} in '{table}', got {count}")]
    RowCount {
        table: String,
        id: i64,
        count: usize,
    },

    /// A row-bound operation was called on a record with no identity.
    #[error("cannot {op} '{table}': id is not set")]
    IdNotSet { op: &'static str, table: String },

    /// A gateway operation that needs a table got a bare-namespace address.
    #[error("cannot {op}, no table in address: '{address}'")]
    TableRequired { op: &'static str, address: String },

    /// An insert address carried a row id.
    #[error("cannot insert, address contains an id: '{0}'")]
    IdNotAllowed(String),

    /// A raw (bare-namespace) query was issued while the escape hatch is
    /// disabled.
    #[error("raw queries are disabled for this gateway")]
    RawQueryDisabled,

    /// A name is not safe to splice into SQL as an identifier.
    #[error("invalid identifier in SQL position: '{0}'")]
    BadIdentifier(String),

    /// A required schema script could not be resolved.
    #[error("schema script '{0}' not found")]
    ScriptNotFound(String),

    /// A version upgrade script failed to execute.
    #[error("upgrade to version {version} failed (script '{script}'): {source}")]
    Migration {
        version: u32,
        script: String,
        #[source]
        source: Box<StoreError>,
    },

    /// The stored schema version is newer than the target.
    #[error("cannot downgrade from schema version {stored} to {target}")]
    Downgrade { stored: u32, target: u32 },

    /// The engine was compiled without foreign key support.
    #[error("storage engine has no foreign key support")]
    ForeignKeysUnsupported,

    /// Foreign keys are off and the connection cannot be mutated to enable
    /// them.
    #[error("cannot enable foreign keys, database is read-only")]
    ReadOnly,
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
