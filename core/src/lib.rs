//! Data model, SQL assembly and row identity for SQLite administration.
//!
//! This crate is the engine-independent half of the administration layer.
//! It defines what the layer knows about a database and how it talks to
//! one, without touching a connection:
//!
//! - [`TableDescriptor`], [`ColumnDescriptor`], [`Row`] and friends: the
//!   normalized model a presentation layer renders.
//! - [`quote_identifier`]: the single chokepoint through which table and
//!   column names enter SQL text.
//! - [`build_insert`], [`build_create_table`], [`build_add_column`]: the
//!   SQL builder. Values always travel as bound parameters.
//! - [`compute_identity`] and [`build_lookup_predicate`]: the row identity
//!   resolver that addresses a single row from a URL-safe string.
//!
//! # Example
//!
//! ```
//! use sqlite_admin_core::*;
//!
//! let create = build_create_table("notes").unwrap();
//! let add = build_add_column("notes", "body", ColumnType::Text).unwrap();
//! let insert = build_insert("notes", [("body", Value::from("hello"))]).unwrap();
//!
//! assert!(create.starts_with("CREATE TABLE"));
//! assert!(add.ends_with("TEXT"));
//! assert_eq!(insert.params, vec![Value::from("hello")]);
//!
//! // Tables created above key rows by their `id` column.
//! let key = vec!["id".to_string()];
//! let mut row = Row::new();
//! row.push("id", 1);
//! row.push("body", "hello");
//! assert_eq!(compute_identity(&key, &row).unwrap(), "1");
//! ```

mod builder;
mod error;
mod format;
mod identifier;
mod identity;
mod types;

pub use builder::{
    COLUMN_FIELD_PREFIX, IDENTITY_COLUMN, Statement, build_add_column, build_count_rows,
    build_create_table, build_insert, build_select_row, build_select_rows, columns_from_form_fields,
};
pub use error::{CoreError, Result};
pub use format::{format_create_sql, format_file_size};
pub use identifier::{quote_identifier, validate_identifier};
pub use identity::{
    IDENTITY_SEPARATOR, KeyColumn, KeySpec, RowIdColumn, build_lookup_predicate, compute_identity,
    lookup_candidates,
};
pub use types::*;
