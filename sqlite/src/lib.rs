//! Async SQLite access for the sqlite-admin tool.
//!
//! This crate turns an open database file into the normalized model
//! defined by [`sqlite_admin_core`]: tables, columns, primary keys, row
//! counts and addressable rows.
//!
//! # Architecture
//!
//! The crate is organized into four modules:
//!
//! - **`connection`**: [`Connection`], one handle per file; every engine call
//!   runs on tokio's blocking pool and calls on one handle never interleave
//! - **`introspect`**: [`Introspector`], catalog queries (tables, columns,
//!   key order, row counts, creation statements)
//! - **`database`**: [`Database`], the operations a presentation layer
//!   calls (row listing, row lookup by identity, create/alter/insert)
//! - **`convert`**: value conversion between core and `rusqlite` types
//!
//! # Quick start
//!
//! ```no_run
//! use sqlite_admin_sqlite::Database;
//!
//! #[tokio::main]
//! async fn main() -> sqlite_admin_sqlite::Result<()> {
//!     let db = Database::open("app.db")?;
//!     for table in db.tables().await? {
//!         println!("{} ({} rows)", table.name, table.row_count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Missing tables
//!
//! Every per-table operation fails with [`SqliteError::TableNotFound`] when
//! the table is absent from the catalog.

mod connection;
mod convert;
mod database;
mod error;
mod introspect;

pub use connection::{Connection, MEMORY_PATH};
pub use database::Database;
pub use error::{Result, SqliteError};
pub use introspect::Introspector;
