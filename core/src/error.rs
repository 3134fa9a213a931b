//! Error types for SQL assembly and row identity resolution.
//!
//! Everything in this crate is pure: failures are about malformed input
//! (an identifier that cannot be quoted, an identity string that does not
//! fit the table's key), never about the engine.

use thiserror::Error;

/// Errors raised while building SQL or resolving row identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Identifier is empty or contains NUL/control characters.
    #[error("invalid identifier {0:?}: must be non-empty and free of control characters")]
    InvalidIdentifier(String),

    /// An INSERT was requested with no columns.
    #[error("cannot insert into '{0}' without any column values")]
    EmptyInsert(String),

    /// Column type name is not one of the offered types.
    #[error("unknown column type: {0}")]
    UnknownColumnType(String),

    /// Identity has a different number of components than the key.
    #[error("row identity '{identity}' has {found} component(s), expected {expected}")]
    IdentityMismatch {
        identity: String,
        expected: usize,
        found: usize,
    },

    /// Keyless table whose columns shadow every name of the implicit row
    /// identifier (`rowid`, `_rowid_`, `oid`).
    #[error("rows of '{0}' cannot be addressed: its columns shadow rowid, _rowid_ and oid")]
    RowIdUnavailable(String),

    /// A key column (or the implicit rowid) is missing from a row.
    #[error("row has no value for key column '{0}'")]
    MissingKeyColumn(String),

    /// Identity of a rowid-addressed table is not an integer.
    #[error("invalid rowid in row identity: {0}")]
    InvalidRowId(String),
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
