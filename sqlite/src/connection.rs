//! Async wrapper around a single SQLite handle.
//!
//! A [`Connection`] owns exactly one `rusqlite` handle behind a mutex.
//! Each engine call runs on tokio's blocking pool while holding that
//! mutex, so the caller suspends until the engine replies, calls against
//! the same connection run one at a time, and calls against different
//! connections run independently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::params_from_iter;
use sqlite_admin_core::{Row, Statement};
use tracing::debug;

use crate::convert::{read_row, to_sql_value};
use crate::error::{Result, SqliteError};

/// Path reported by connections opened with [`Connection::open_in_memory`].
pub const MEMORY_PATH: &str = ":memory:";

/// Shared handle to one open database file.
///
/// Cloning is cheap and every clone refers to the same underlying handle.
#[derive(Clone)]
pub struct Connection {
    path: PathBuf,
    inner: Arc<Mutex<rusqlite::Connection>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("path", &self.path).finish()
    }
}

impl Connection {
    /// Opens (creating if necessary) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::EngineError`] if the file cannot be opened
    /// as a SQLite database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&path)?;
        // Opening is lazy; touch the schema so unreadable files fail here.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        debug!(path = %path.display(), "opened database");
        Ok(Self::from_rusqlite(path, conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Ok(Self::from_rusqlite(PathBuf::from(MEMORY_PATH), conn))
    }

    fn from_rusqlite(path: PathBuf, conn: rusqlite::Connection) -> Self {
        Self {
            path,
            inner: Arc::new(Mutex::new(conn)),
        }
    }

    /// The path this connection was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` against the raw handle on the blocking pool.
    ///
    /// This is the single suspension point of every engine call; all other
    /// methods are built on it. Several statements issued inside one `f`
    /// observe a consistent view because no other call on this connection
    /// can interleave with them.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let conn = inner.lock();
            f(&conn)
        })
        .await
        .map_err(|e| SqliteError::TaskFailed(e.to_string()))?
    }

    /// Executes one statement with positional parameters and returns the
    /// number of changed rows.
    pub async fn execute(&self, statement: Statement) -> Result<usize> {
        self.call(move |conn| execute_statement(conn, &statement)).await
    }

    /// Executes one or more parameterless statements separated by `;`.
    pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
        let sql = sql.into();
        self.call(move |conn| {
            debug!(sql = %sql, "executing batch");
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
    }

    /// Fetches every row produced by `statement`.
    pub async fn query_all(&self, statement: Statement) -> Result<Vec<Row>> {
        self.call(move |conn| query_rows(conn, &statement)).await
    }

    /// Fetches the first row produced by `statement`, if any.
    pub async fn query_one(&self, statement: Statement) -> Result<Option<Row>> {
        self.call(move |conn| query_first(conn, &statement)).await
    }
}

/// Synchronous form of [`Connection::execute`] for use inside [`Connection::call`].
pub(crate) fn execute_statement(conn: &rusqlite::Connection, statement: &Statement) -> Result<usize> {
    debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");
    let params = params_from_iter(statement.params.iter().map(to_sql_value));
    Ok(conn.execute(&statement.sql, params)?)
}

/// Synchronous form of [`Connection::query_all`] for use inside [`Connection::call`].
pub(crate) fn query_rows(conn: &rusqlite::Connection, statement: &Statement) -> Result<Vec<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "querying rows");
    let mut stmt = conn.prepare(&statement.sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let params = params_from_iter(statement.params.iter().map(to_sql_value));
    let rows = stmt
        .query_map(params, |row| read_row(row, &names))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Synchronous form of [`Connection::query_one`] for use inside [`Connection::call`].
pub(crate) fn query_first(conn: &rusqlite::Connection, statement: &Statement) -> Result<Option<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "querying one row");
    let mut stmt = conn.prepare(&statement.sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let params = params_from_iter(statement.params.iter().map(to_sql_value));
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(read_row(row, &names)?)),
        None => Ok(None),
    }
}
