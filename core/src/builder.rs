//! SQL statement assembly.
//!
//! Pure functions that turn table/column names and values into statement
//! text plus positional parameters. Names are interpolated through
//! [`quote_identifier`]; values are never interpolated and always travel
//! as bound parameters in [`Statement::params`].
//!
//! # Example
//!
//! ```
//! use sqlite_admin_core::{Value, build_insert};
//!
//! let stmt = build_insert("people", [("name", Value::from("Ann")), ("age", Value::from(30))])
//!     .unwrap();
//! assert_eq!(stmt.sql, r#"INSERT INTO "people"("name","age") VALUES(?1,?2)"#);
//! assert_eq!(stmt.params, vec![Value::from("Ann"), Value::from(30)]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::identifier::quote_identifier;
use crate::identity::RowIdColumn;
use crate::types::{ColumnType, ROWID_ALIAS, Value};

/// Name of the identity column created by [`build_create_table`].
pub const IDENTITY_COLUMN: &str = "id";

/// Statement text with its positional parameters.
///
/// Placeholders are numbered `?1..?N` and `params[i]` binds to `?{i+1}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Creates a statement with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a statement with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Builds a parameterized `INSERT` from column/value pairs.
///
/// Pairs are consumed in iteration order; the column list and the bound
/// values appear in that same order.
///
/// # Errors
///
/// Returns [`CoreError::EmptyInsert`] when no pairs are given, and
/// [`CoreError::InvalidIdentifier`] when a name cannot be quoted.
pub fn build_insert<I, K, V>(table: &str, values: I) -> Result<Statement>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let table_ident = quote_identifier(table)?;
    let mut columns = Vec::new();
    let mut params = Vec::new();
    for (column, value) in values {
        columns.push(quote_identifier(column.as_ref())?);
        params.push(value.into());
    }
    if columns.is_empty() {
        return Err(CoreError::EmptyInsert(table.to_string()));
    }

    let sql = format!(
        "INSERT INTO {table_ident}({}) VALUES({})",
        columns.join(","),
        placeholders(1, params.len())
    );
    Ok(Statement::with_params(sql, params))
}

/// Prefix marking form fields that carry column values (`col:<name>`).
pub const COLUMN_FIELD_PREFIX: &str = "col:";

/// Maps submitted form fields to bare column/value pairs for
/// [`build_insert`].
///
/// Only fields named `col:<name>` are kept, in submission order, with the
/// prefix removed. Every other field is ignored.
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::{Value, columns_from_form_fields};
///
/// let fields = [("col:name", "Ann"), ("redirect", "/"), ("col:age", "30")];
/// let columns = columns_from_form_fields(fields);
/// assert_eq!(
///     columns,
///     vec![
///         ("name".to_string(), Value::from("Ann")),
///         ("age".to_string(), Value::from("30")),
///     ]
/// );
/// ```
pub fn columns_from_form_fields<I, K, V>(fields: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .filter_map(|(field, value)| {
            field
                .as_ref()
                .strip_prefix(COLUMN_FIELD_PREFIX)
                .map(|column| (column.to_string(), value.into()))
        })
        .collect()
}

/// Builds `CREATE TABLE` for a table holding only an integer identity
/// column. The column aliases the rowid, so new rows are numbered
/// automatically; further columns are added with [`build_add_column`].
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::build_create_table;
///
/// assert_eq!(
///     build_create_table("t").unwrap(),
///     r#"CREATE TABLE "t" ("id" INTEGER PRIMARY KEY)"#
/// );
/// ```
pub fn build_create_table(table: &str) -> Result<String> {
    Ok(format!(
        "CREATE TABLE {} ({} INTEGER PRIMARY KEY)",
        quote_identifier(table)?,
        quote_identifier(IDENTITY_COLUMN)?
    ))
}

/// Builds `ALTER TABLE .. ADD COLUMN`.
pub fn build_add_column(table: &str, column: &str, column_type: ColumnType) -> Result<String> {
    Ok(format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        quote_identifier(table)?,
        quote_identifier(column)?,
        column_type.as_sql()
    ))
}

/// Builds `SELECT count(*)` over a whole table.
pub fn build_count_rows(table: &str) -> Result<String> {
    Ok(format!("SELECT count(*) FROM {}", quote_identifier(table)?))
}

fn select_prefix(table: &str, rowid: Option<RowIdColumn>) -> Result<String> {
    let table_ident = quote_identifier(table)?;
    match rowid {
        Some(rowid) => Ok(format!(
            "SELECT {rowid} AS {}, * FROM {table_ident}",
            quote_identifier(ROWID_ALIAS)?
        )),
        None => Ok(format!("SELECT * FROM {table_ident}")),
    }
}

/// Builds a `SELECT` of at most `limit` rows.
///
/// With `rowid` the implicit row identifier is selected first, through that
/// name, under [`ROWID_ALIAS`]; use it for tables without an explicit
/// primary key.
pub fn build_select_rows(table: &str, rowid: Option<RowIdColumn>, limit: u64) -> Result<Statement> {
    let sql = format!("{} LIMIT ?1", select_prefix(table, rowid)?);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    Ok(Statement::with_params(sql, vec![Value::Integer(limit)]))
}

/// Builds a single-row `SELECT` filtered by `predicate`.
///
/// The predicate's parameters become the statement's parameters; see
/// [`build_lookup_predicate`](crate::build_lookup_predicate).
pub fn build_select_row(
    table: &str,
    rowid: Option<RowIdColumn>,
    predicate: Statement,
) -> Result<Statement> {
    let sql = format!(
        "{} WHERE {} LIMIT 1",
        select_prefix(table, rowid)?,
        predicate.sql
    );
    Ok(Statement::with_params(sql, predicate.params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnDescriptor;

    #[test]
    fn test_insert_preserves_mapping_order() {
        let stmt = build_insert("people", vec![("name", Value::from("Ann")), ("age", Value::from(30))])
            .unwrap();
        assert!(stmt.sql.contains(r#"("name","age")"#));
        assert_eq!(stmt.params.len(), 2);
        assert_eq!(stmt.params[0], Value::Text("Ann".into()));
        assert_eq!(stmt.params[1], Value::Integer(30));
        assert!(stmt.sql.ends_with("VALUES(?1,?2)"));
    }

    #[test]
    fn test_insert_reversed_order() {
        let stmt = build_insert("people", vec![("age", Value::from(30)), ("name", Value::from("Ann"))])
            .unwrap();
        assert!(stmt.sql.contains(r#"("age","name")"#));
        assert_eq!(stmt.params, vec![Value::Integer(30), Value::from("Ann")]);
    }

    #[test]
    fn test_insert_never_interpolates_values() {
        let stmt = build_insert("t", [("label", "'); DROP TABLE t; --")]).unwrap();
        assert!(!stmt.sql.contains("DROP"));
        assert_eq!(stmt.params, vec![Value::from("'); DROP TABLE t; --")]);
    }

    #[test]
    fn test_insert_rejects_empty_mapping() {
        let empty: Vec<(&str, Value)> = Vec::new();
        assert_eq!(
            build_insert("t", empty),
            Err(CoreError::EmptyInsert("t".to_string()))
        );
    }

    #[test]
    fn test_insert_rejects_bad_identifier() {
        assert!(matches!(
            build_insert("t", [("", Value::Null)]),
            Err(CoreError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            build_insert("", [("a", Value::Null)]),
            Err(CoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_form_fields_feed_insert() {
        let fields = vec![("col:label".to_string(), "x".to_string()), ("tableName".to_string(), "t".to_string())];
        let stmt = build_insert("t", columns_from_form_fields(fields)).unwrap();
        assert_eq!(stmt.sql, r#"INSERT INTO "t"("label") VALUES(?1)"#);
        assert_eq!(stmt.params, vec![Value::from("x")]);
    }

    #[test]
    fn test_add_column() {
        assert_eq!(
            build_add_column("t", "label", ColumnType::Text).unwrap(),
            r#"ALTER TABLE "t" ADD COLUMN "label" TEXT"#
        );
    }

    #[test]
    fn test_select_rows_with_and_without_rowid() {
        let with = build_select_rows("t", Some(RowIdColumn::ROWID), 25).unwrap();
        assert_eq!(
            with.sql,
            format!(r#"SELECT rowid AS "{ROWID_ALIAS}", * FROM "t" LIMIT ?1"#)
        );
        assert_eq!(with.params, vec![Value::Integer(25)]);

        let without = build_select_rows("t", None, 25).unwrap();
        assert_eq!(without.sql, r#"SELECT * FROM "t" LIMIT ?1"#);
    }

    #[test]
    fn test_select_uses_given_rowid_name() {
        let columns = vec![ColumnDescriptor {
            name: "rowid".to_string(),
            column_type: "TEXT".to_string(),
            nullable: true,
            default_value: None,
            primary_key_ordinal: 0,
            hidden: false,
        }];
        let stmt = build_select_rows("t", RowIdColumn::for_columns(&columns), 5).unwrap();
        assert_eq!(
            stmt.sql,
            format!(r#"SELECT _rowid_ AS "{ROWID_ALIAS}", * FROM "t" LIMIT ?1"#)
        );
    }

    #[test]
    fn test_select_row_carries_predicate_params() {
        let predicate = Statement::with_params(r#""a" = ?1"#, vec![Value::from("x")]);
        let stmt = build_select_row("t", None, predicate).unwrap();
        assert_eq!(stmt.sql, r#"SELECT * FROM "t" WHERE "a" = ?1 LIMIT 1"#);
        assert_eq!(stmt.params, vec![Value::from("x")]);
    }

    #[test]
    fn test_count_rows() {
        assert_eq!(build_count_rows("t").unwrap(), r#"SELECT count(*) FROM "t""#);
    }
}
