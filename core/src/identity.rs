//! Row identity resolution.
//!
//! A row identity is the string used to address one row in a URL. For a
//! table with a primary key it is the key values, in key order, joined
//! with commas; for a table without one it is the implicit rowid.
//!
//! Key values render through [`Value`]'s `Display`: `NULL` as an empty
//! component, blobs as lowercase hex. [`build_lookup_predicate`] reverses
//! that rendering per column affinity, so every identity handed out by
//! [`compute_identity`] selects its row again, whatever the key types.
//!
//! Commas inside key values are not escaped. A key value containing a
//! comma produces an identity that splits into too many components, and
//! [`build_lookup_predicate`] rejects it with
//! [`CoreError::IdentityMismatch`] instead of addressing the wrong row.
//!
//! # Example
//!
//! ```
//! use sqlite_admin_core::{Affinity, KeyColumn, KeySpec, Row, build_lookup_predicate, compute_identity};
//!
//! let key = KeySpec::Columns(vec![
//!     KeyColumn::new("region", Affinity::Text),
//!     KeyColumn::new("code", Affinity::Integer),
//! ]);
//! let mut row = Row::new();
//! row.push("code", 7);
//! row.push("region", "eu");
//!
//! let identity = compute_identity(&key.key_names(), &row).unwrap();
//! assert_eq!(identity, "eu,7");
//!
//! let predicate = build_lookup_predicate(&key, &identity).unwrap();
//! assert_eq!(predicate.sql, r#""region" = ?1 AND "code" = ?2"#);
//! ```

use std::fmt;

use crate::builder::Statement;
use crate::error::{CoreError, Result};
use crate::identifier::quote_identifier;
use crate::types::{Affinity, ColumnDescriptor, Row, Value, primary_key_order};

/// Separator between key components.
pub const IDENTITY_SEPARATOR: &str = ",";

/// A name under which a table's implicit row identifier is reachable.
///
/// SQLite answers to `rowid`, `_rowid_` and `oid`, unless a declared
/// column takes the name. Values of this type only ever hold one of those
/// three names, so they are written into SQL unquoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowIdColumn(&'static str);

impl RowIdColumn {
    /// The conventional name, usable when no column shadows it.
    pub const ROWID: RowIdColumn = RowIdColumn("rowid");

    const NAMES: [&'static str; 3] = ["rowid", "_rowid_", "oid"];

    /// Picks the first row identifier name not shadowed by `columns`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlite_admin_core::{ColumnDescriptor, RowIdColumn};
    ///
    /// let column = |name: &str| ColumnDescriptor {
    ///     name: name.to_string(),
    ///     column_type: "TEXT".to_string(),
    ///     nullable: true,
    ///     default_value: None,
    ///     primary_key_ordinal: 0,
    ///     hidden: false,
    /// };
    /// let picked = RowIdColumn::for_columns(&[column("ROWID"), column("v")]).unwrap();
    /// assert_eq!(picked.as_str(), "_rowid_");
    /// ```
    pub fn for_columns(columns: &[ColumnDescriptor]) -> Option<Self> {
        Self::NAMES
            .into_iter()
            .find(|name| !columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)))
            .map(RowIdColumn)
    }

    /// The name as written into SQL.
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RowIdColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One primary-key column and the affinity its comparisons run under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub affinity: Affinity,
}

impl KeyColumn {
    pub fn new(name: impl Into<String>, affinity: Affinity) -> Self {
        Self {
            name: name.into(),
            affinity,
        }
    }
}

/// How the rows of one table are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    /// Explicit primary key, highest key ordinal first.
    Columns(Vec<KeyColumn>),
    /// No primary key; rows are addressed by the implicit rowid.
    RowId(RowIdColumn),
}

impl KeySpec {
    /// Derives the addressing scheme of `table` from its columns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowIdUnavailable`] for a keyless table whose
    /// columns shadow all three row identifier names.
    pub fn for_columns(table: &str, columns: &[ColumnDescriptor]) -> Result<Self> {
        let key = primary_key_order(columns);
        if key.is_empty() {
            return RowIdColumn::for_columns(columns)
                .map(KeySpec::RowId)
                .ok_or_else(|| CoreError::RowIdUnavailable(table.to_string()));
        }

        let key = key
            .into_iter()
            .map(|name| {
                let affinity = columns
                    .iter()
                    .find(|c| c.name == name)
                    .map_or(Affinity::Blob, ColumnDescriptor::affinity);
                KeyColumn { name, affinity }
            })
            .collect();
        Ok(KeySpec::Columns(key))
    }

    /// Key column names in identity order; empty for rowid addressing.
    pub fn key_names(&self) -> Vec<String> {
        match self {
            KeySpec::Columns(columns) => columns.iter().map(|c| c.name.clone()).collect(),
            KeySpec::RowId(_) => Vec::new(),
        }
    }

    /// The row identifier name to select, for rowid addressing.
    pub fn rowid(&self) -> Option<RowIdColumn> {
        match self {
            KeySpec::Columns(_) => None,
            KeySpec::RowId(rowid) => Some(*rowid),
        }
    }
}

/// Computes the identity string of `row`.
///
/// With an empty `primary_key` the row's implicit rowid is used; otherwise
/// the value of each key column, in the given order, joined by commas.
/// `NULL` key values render as empty components.
///
/// # Errors
///
/// Returns [`CoreError::MissingKeyColumn`] when the row lacks a key column
/// (or the rowid, for keyless tables).
pub fn compute_identity(primary_key: &[String], row: &Row) -> Result<String> {
    if primary_key.is_empty() {
        return row
            .rowid
            .map(|rowid| rowid.to_string())
            .ok_or_else(|| CoreError::MissingKeyColumn("rowid".to_string()));
    }

    let mut components = Vec::with_capacity(primary_key.len());
    for column in primary_key {
        let value = row
            .get(column)
            .ok_or_else(|| CoreError::MissingKeyColumn(column.clone()))?;
        components.push(value.to_string());
    }
    Ok(components.join(IDENTITY_SEPARATOR))
}

/// Builds the conjunctive predicate selecting the row addressed by
/// `identity`.
///
/// Every component is bound as a parameter (`?1..?N`); only the quoted key
/// column names appear in the predicate text. A component may stand for
/// several stored values, so it binds every candidate its rendering could
/// have come from (see [`lookup_candidates`]) and matches any of them. An
/// empty component also matches `NULL`.
///
/// # Errors
///
/// Returns [`CoreError::IdentityMismatch`] when the component count differs
/// from the key length and [`CoreError::InvalidRowId`] for a non-integer
/// rowid.
pub fn build_lookup_predicate(key: &KeySpec, identity: &str) -> Result<Statement> {
    let columns = match key {
        KeySpec::RowId(rowid) => {
            let rowid_value: i64 = identity
                .trim()
                .parse()
                .map_err(|_| CoreError::InvalidRowId(identity.to_string()))?;
            return Ok(Statement::with_params(
                format!("{rowid} = ?1"),
                vec![Value::Integer(rowid_value)],
            ));
        }
        KeySpec::Columns(columns) => columns,
    };

    let components: Vec<&str> = identity.split(IDENTITY_SEPARATOR).collect();
    if components.len() != columns.len() {
        return Err(CoreError::IdentityMismatch {
            identity: identity.to_string(),
            expected: columns.len(),
            found: components.len(),
        });
    }

    let mut clauses = Vec::with_capacity(columns.len());
    let mut params = Vec::new();
    for (column, component) in columns.iter().zip(components) {
        let ident = quote_identifier(&column.name)?;
        let candidates = lookup_candidates(component, column.affinity);
        let first = params.len() + 1;
        let clause = if candidates.len() == 1 {
            format!("{ident} = ?{first}")
        } else {
            let placeholders = (first..first + candidates.len())
                .map(|n| format!("?{n}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{ident} IN ({placeholders})")
        };
        params.extend(candidates);

        if component.is_empty() {
            clauses.push(format!("({ident} IS NULL OR {clause})"));
        } else {
            clauses.push(clause);
        }
    }
    Ok(Statement::with_params(clauses.join(" AND "), params))
}

/// Values whose rendering is `component`, for a column of `affinity`.
///
/// Text is always a candidate: columns with integer, real, numeric or text
/// affinity convert it to their own storage class before comparing. Blob
/// affinity converts nothing, so integers and reals are offered explicitly.
/// A component that reads as hex also offers the decoded blob.
pub fn lookup_candidates(component: &str, affinity: Affinity) -> Vec<Value> {
    let mut candidates = Vec::with_capacity(3);
    if affinity == Affinity::Blob {
        if let Ok(integer) = component.parse::<i64>() {
            candidates.push(Value::Integer(integer));
        } else if let Some(real) = component.parse::<f64>().ok().filter(|r| r.is_finite()) {
            candidates.push(Value::Real(real));
        }
    }
    candidates.push(Value::Text(component.to_string()));
    if let Some(bytes) = decode_hex(component) {
        candidates.push(Value::Blob(bytes));
    }
    candidates
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = char::from(pair[0]).to_digit(16)?;
            let low = char::from(pair[1]).to_digit(16)?;
            u8::try_from(high * 16 + low).ok()
        })
        .collect()
}
