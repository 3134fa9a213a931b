//! Schema discovery from the SQLite catalog.
//!
//! Provides [`Introspector`], which answers questions about the tables of
//! one database: their names, columns, primary keys, row counts and
//! creation statements. Nothing is cached; every call re-reads the
//! catalog so results always reflect the live schema.
//!
//! Every per-table call fails with [`SqliteError::TableNotFound`] when the
//! table is absent, so a missing table is never confused with an empty one.
//!
//! # Example
//!
//! ```no_run
//! use sqlite_admin_sqlite::{Connection, Introspector};
//!
//! # async fn demo() -> sqlite_admin_sqlite::Result<()> {
//! let conn = Connection::open("app.db")?;
//! let introspector = Introspector::new(conn);
//!
//! for name in introspector.list_table_names().await? {
//!     let key = introspector.primary_key_columns(&name).await?;
//!     println!("{name}: key {key:?}");
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::{OptionalExtension, params};
use sqlite_admin_core::{
    ColumnDescriptor, TableDescriptor, TableOverview, build_count_rows, format_create_sql,
    primary_key_order,
};

use crate::connection::Connection;
use crate::error::{Result, SqliteError};

/// Read-only view of a database's catalog.
#[derive(Debug, Clone)]
pub struct Introspector {
    conn: Connection,
}

impl Introspector {
    /// Creates an introspector over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Lists the names of all tables, in catalog order.
    ///
    /// Returns an empty vector for a database without tables.
    pub async fn list_table_names(&self) -> Result<Vec<String>> {
        self.conn.call(table_names).await
    }

    /// Returns `true` if a table named `name` exists.
    pub async fn table_exists(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.conn.call(move |conn| table_exists(conn, &name)).await
    }

    /// Counts the rows of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`] if the table does not exist.
    pub async fn table_row_count(&self, name: &str) -> Result<u64> {
        let name = name.to_string();
        self.conn
            .call(move |conn| {
                ensure_table(conn, &name)?;
                row_count(conn, &name)
            })
            .await
    }

    /// Reads the column metadata of `name`, hidden and generated columns
    /// included, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`] if the table does not exist.
    pub async fn table_columns(&self, name: &str) -> Result<Vec<ColumnDescriptor>> {
        let name = name.to_string();
        self.conn
            .call(move |conn| {
                ensure_table(conn, &name)?;
                table_columns(conn, &name)
            })
            .await
    }

    /// Returns the primary-key columns of `name`, highest key ordinal first.
    ///
    /// An empty result means rows are addressed by their implicit rowid.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`] if the table does not exist.
    pub async fn primary_key_columns(&self, name: &str) -> Result<Vec<String>> {
        let columns = self.table_columns(name).await?;
        Ok(primary_key_order(&columns))
    }

    /// Returns the formatted `CREATE TABLE` statement of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TableNotFound`] if the catalog has no entry
    /// for the table.
    pub async fn table_definition_sql(&self, name: &str) -> Result<String> {
        let name = name.to_string();
        self.conn
            .call(move |conn| {
                let sql: Option<Option<String>> = conn
                    .query_row(
                        "SELECT sql FROM sqlite_master \
                         WHERE type = 'table' AND tbl_name = ?1 COLLATE NOCASE",
                        params![name],
                        |row| row.get(0),
                    )
                    .optional()?;
                match sql.flatten() {
                    Some(sql) => Ok(format_create_sql(&sql)),
                    None => Err(SqliteError::TableNotFound(name)),
                }
            })
            .await
    }

    /// Lists every table with its column and row counts.
    pub async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.conn
            .call(|conn| {
                table_names(conn)?
                    .into_iter()
                    .map(|name| describe_table(conn, name))
                    .collect()
            })
            .await
    }

    /// Lists every table with its columns and primary-key order.
    pub async fn overview(&self) -> Result<Vec<TableOverview>> {
        self.conn
            .call(|conn| {
                let mut tables = Vec::new();
                for name in table_names(conn)? {
                    let columns = table_columns(conn, &name)?;
                    let primary_key = primary_key_order(&columns);
                    let row_count = row_count(conn, &name)?;
                    tables.push(TableOverview {
                        table: TableDescriptor {
                            name,
                            column_count: columns.len(),
                            row_count,
                        },
                        columns,
                        primary_key,
                    });
                }
                Ok(tables)
            })
            .await
    }
}

pub(crate) fn table_names(conn: &rusqlite::Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

pub(crate) fn table_exists(conn: &rusqlite::Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn ensure_table(conn: &rusqlite::Connection, name: &str) -> Result<()> {
    if table_exists(conn, name)? {
        Ok(())
    } else {
        Err(SqliteError::TableNotFound(name.to_string()))
    }
}

pub(crate) fn row_count(conn: &rusqlite::Connection, name: &str) -> Result<u64> {
    let sql = build_count_rows(name)?;
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

pub(crate) fn table_columns(conn: &rusqlite::Connection, name: &str) -> Result<Vec<ColumnDescriptor>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk, hidden FROM pragma_table_xinfo(?1)",
    )?;
    let columns = stmt
        .query_map(params![name], |row| {
            Ok(ColumnDescriptor {
                name: row.get(0)?,
                column_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                nullable: row.get::<_, i64>(2)? == 0,
                default_value: row.get(3)?,
                primary_key_ordinal: u32::try_from(row.get::<_, i64>(4)?).unwrap_or(0),
                hidden: row.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn describe_table(conn: &rusqlite::Connection, name: String) -> Result<TableDescriptor> {
    let column_count = table_columns(conn, &name)?.len();
    let row_count = row_count(conn, &name)?;
    Ok(TableDescriptor {
        name,
        column_count,
        row_count,
    })
}
