//! Error types for SQLite access and introspection.
//!
//! Engine failures are surfaced as-is and never retried. The one failure
//! callers are expected to handle specially is [`SqliteError::TableNotFound`],
//! which a web front end maps to "404 Not Found".

use sqlite_admin_core::CoreError;
use thiserror::Error;

/// Errors that can occur while talking to a database file.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The named table is not in the catalog.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Any failure reported by the SQLite engine (malformed SQL, constraint
    /// violation, disk error, ...).
    #[error("database error: {0}")]
    EngineError(#[from] rusqlite::Error),

    /// Statement assembly or row identity failure.
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    /// File metadata could not be read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The blocking task running an engine call panicked or was cancelled.
    #[error("engine task failed: {0}")]
    TaskFailed(String),
}

impl SqliteError {
    /// Returns `true` for [`SqliteError::TableNotFound`].
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, SqliteError::TableNotFound(_))
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
