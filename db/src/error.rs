//! Error types for registry construction and configuration.
//!
//! Everything except [`RegistryError::NotFound`] is a misconfiguration:
//! the registry refuses to start rather than serve a partial set of
//! databases.

use std::path::PathBuf;

use sqlite_admin_sqlite::SqliteError;
use thiserror::Error;

/// Errors that can occur while building or querying a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two paths map to the same logical name.
    #[error("duplicate database name '{name}': {} and {}", .first.display(), .second.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A path has no file stem to use as a logical name.
    #[error("cannot derive a database name from '{}'", .0.display())]
    InvalidPath(PathBuf),

    /// A path could not be opened as a SQLite database.
    #[error("cannot open database '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: SqliteError,
    },

    /// No database is registered under this logical name.
    #[error("unknown database '{0}'")]
    NotFound(String),

    /// A database call made through the registry failed.
    #[error(transparent)]
    Database(#[from] SqliteError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl RegistryError {
    /// Returns `true` for errors that must stop the process at startup.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. } | Self::InvalidPath(_) | Self::Open { .. }
        )
    }
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
