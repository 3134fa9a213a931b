//! One administered database file.
//!
//! [`Database`] pairs a [`Connection`] with an [`Introspector`] and exposes
//! the operations a presentation layer needs: browsing tables and rows,
//! addressing a single row by its identity, and the few schema and data
//! changes the tool supports (create table, add column, insert row).
//!
//! # Example
//!
//! ```no_run
//! use sqlite_admin_core::{ColumnType, Value};
//! use sqlite_admin_sqlite::Database;
//!
//! # async fn demo() -> sqlite_admin_sqlite::Result<()> {
//! let db = Database::open("notes.db")?;
//! db.create_table("notes").await?;
//! db.add_column("notes", "body", ColumnType::Text).await?;
//! db.insert_row("notes", vec![("body".to_string(), Value::from("hello"))]).await?;
//!
//! for row in db.rows("notes", 100).await? {
//!     println!("{} => {:?}", row.identity, row.row.get("body"));
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlite_admin_core::{
    ColumnDescriptor, ColumnType, DatabaseInfo, IdentifiedRow, KeySpec, Row, TableDescriptor,
    TableOverview, Value, build_add_column, build_create_table, build_insert,
    build_lookup_predicate, build_select_row, build_select_rows, compute_identity,
    format_file_size,
};
use tracing::debug;

use crate::connection::{Connection, query_first, query_rows};
use crate::error::Result;
use crate::introspect::{Introspector, ensure_table, table_columns};

/// An open database together with its introspector.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Connection,
    introspector: Introspector,
}

impl Database {
    /// Opens (creating if necessary) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        let introspector = Introspector::new(conn.clone());
        Self { conn, introspector }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The catalog view of this database.
    pub fn introspector(&self) -> &Introspector {
        &self.introspector
    }

    /// The path the database was opened with.
    pub fn path(&self) -> &Path {
        self.conn.path()
    }

    /// Reads file facts: canonical path, name, size and timestamps.
    ///
    /// Timestamps the platform does not record are `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::IoError`](crate::SqliteError::IoError) if the
    /// file cannot be resolved, which is always the case for in-memory
    /// databases.
    pub async fn info(&self) -> Result<DatabaseInfo> {
        let filepath = tokio::fs::canonicalize(self.path()).await?;
        let metadata = tokio::fs::metadata(&filepath).await?;
        let filename = filepath
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size_bytes = metadata.len();

        Ok(DatabaseInfo {
            filepath: filepath.to_string_lossy().into_owned(),
            filename,
            size_bytes,
            filesize: format_file_size(size_bytes),
            created_at: metadata.created().ok().map(DateTime::<Utc>::from),
            updated_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Lists tables with their row and column counts.
    pub async fn tables(&self) -> Result<Vec<TableDescriptor>> {
        self.introspector.list_tables().await
    }

    /// Lists tables with row counts, columns and key order.
    pub async fn overview(&self) -> Result<Vec<TableOverview>> {
        self.introspector.overview().await
    }

    /// Column metadata of `table`.
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.introspector.table_columns(table).await
    }

    /// Primary-key order of `table`; empty for rowid-addressed tables.
    pub async fn primary_key(&self, table: &str) -> Result<Vec<String>> {
        self.introspector.primary_key_columns(table).await
    }

    /// Formatted creation statement of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`](crate::SqliteError::TableNotFound)
    /// when the table does not exist.
    pub async fn schema_sql(&self, table: &str) -> Result<String> {
        self.introspector.table_definition_sql(table).await
    }

    /// Fetches up to `limit` rows of `table`, each paired with its identity.
    pub async fn rows(&self, table: &str, limit: u64) -> Result<Vec<IdentifiedRow>> {
        let table = table.to_string();
        self.conn
            .call(move |conn| {
                ensure_table(conn, &table)?;
                let key = KeySpec::for_columns(&table, &table_columns(conn, &table)?)?;
                let primary_key = key.key_names();
                let statement = build_select_rows(&table, key.rowid(), limit)?;
                query_rows(conn, &statement)?
                    .into_iter()
                    .map(|row| identify(&primary_key, row))
                    .collect()
            })
            .await
    }

    /// Fetches the row of `table` addressed by `identity`.
    ///
    /// Returns `None` when no row matches.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`](crate::SqliteError::TableNotFound)
    /// for a missing table, and
    /// [`SqliteError::InvalidInput`](crate::SqliteError::InvalidInput) when
    /// the identity does not fit the table's key.
    pub async fn row(&self, table: &str, identity: &str) -> Result<Option<IdentifiedRow>> {
        let table = table.to_string();
        let identity = identity.to_string();
        self.conn
            .call(move |conn| {
                ensure_table(conn, &table)?;
                let key = KeySpec::for_columns(&table, &table_columns(conn, &table)?)?;
                let primary_key = key.key_names();
                let predicate = build_lookup_predicate(&key, &identity)?;
                let statement = build_select_row(&table, key.rowid(), predicate)?;
                query_first(conn, &statement)?
                    .map(|row| identify(&primary_key, row))
                    .transpose()
            })
            .await
    }

    /// Creates `table` with a single integer identity column.
    pub async fn create_table(&self, table: &str) -> Result<()> {
        let sql = build_create_table(table)?;
        debug!(table, "creating table");
        self.conn.execute_batch(sql).await
    }

    /// Adds a column of one of the offered types to `table`.
    pub async fn add_column(&self, table: &str, column: &str, column_type: ColumnType) -> Result<()> {
        let sql = build_add_column(table, column, column_type)?;
        debug!(table, column, %column_type, "adding column");
        self.conn.execute_batch(sql).await
    }

    /// Inserts one row from column/value pairs, in the given order.
    ///
    /// Columns are not checked against the schema; an unknown column
    /// surfaces as an engine error.
    pub async fn insert_row(&self, table: &str, values: Vec<(String, Value)>) -> Result<()> {
        let statement = build_insert(table, values)?;
        self.conn.execute(statement).await.map(|_| ())
    }
}

fn identify(primary_key: &[String], row: Row) -> Result<IdentifiedRow> {
    let identity = compute_identity(primary_key, &row)?;
    Ok(IdentifiedRow { identity, row })
}
