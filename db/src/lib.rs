//! Registry of administered SQLite databases.
//!
//! A process administers a fixed set of database files. This crate opens
//! them once at startup, names each after its file stem, and hands out
//! [`Database`](sqlite_admin_sqlite::Database) handles by that name. The
//! set is described by a YAML [`RegistryConfig`].
//!
//! # Quick start
//!
//! ```no_run
//! use sqlite_admin_db::{Registry, RegistryConfig};
//!
//! # async fn demo() -> sqlite_admin_db::Result<()> {
//! let config = RegistryConfig::load("sqlite-admin.yml")?;
//! let registry = Registry::from_config(&config)?;
//!
//! for name in registry.names() {
//!     let tables = registry.get(name)?.tables().await?;
//!     println!("{name}: {} tables", tables.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Construction fails fast: a duplicate name, a path without a usable
//! stem or an unopenable file stops the registry from being built at all.

mod config;
mod error;
mod registry;

pub use config::{DEFAULT_ROW_LIMIT, RegistryConfig};
pub use error::{RegistryError, Result};
pub use registry::{DatabaseSummary, Registry};
