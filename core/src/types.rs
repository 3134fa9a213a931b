//! Data model for introspected SQLite databases.
//!
//! These types describe what the administration layer knows about a
//! database file: its tables, their columns and keys, and the rows they
//! hold. All of them are plain values derived on demand from the engine
//! and are designed for serialization with [`serde`] so a presentation
//! layer can render them directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Column name under which the implicit rowid is selected for tables
/// without an explicit primary key.
pub const ROWID_ALIAS: &str = "__sqlite_admin_rowid";

/// A single cell value, mirroring SQLite's storage classes.
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::Value;
///
/// assert_eq!(Value::from("Ann"), Value::Text("Ann".into()));
/// assert_eq!(Value::from(30), Value::Integer(30));
/// assert_eq!(Value::Integer(30).to_string(), "30");
/// assert_eq!(Value::Null.to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Renders the value the way it appears inside a row identity or a table
/// cell. `NULL` renders as the empty string and blobs as lowercase hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Blob(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Converts a JSON scalar into a cell value.
///
/// Arrays and objects have no SQLite storage class and are stored as
/// their JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::from(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Column types offered when adding a column.
///
/// Parsing is case-insensitive; the canonical spelling is uppercase.
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::ColumnType;
///
/// let ty: ColumnType = "text".parse().unwrap();
/// assert_eq!(ty, ColumnType::Text);
/// assert_eq!(ty.as_sql(), "TEXT");
/// assert!("JSONB".parse::<ColumnType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Varchar,
    Text,
    Integer,
    Real,
    Bool,
    Blob,
    Datetime,
    Date,
    Time,
    Decimal,
}

impl ColumnType {
    /// Every selectable type, in display order.
    pub const ALL: [ColumnType; 10] = [
        ColumnType::Varchar,
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Bool,
        ColumnType::Blob,
        ColumnType::Datetime,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::Decimal,
    ];

    /// The type name as written into DDL.
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Bool => "BOOL",
            ColumnType::Blob => "BLOB",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Decimal => "DECIMAL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ColumnType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ColumnType::ALL
            .into_iter()
            .find(|ty| ty.as_sql().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownColumnType(s.to_string()))
    }
}

/// Summary of one table: its name and current sizes.
///
/// Never cached; every instance reflects the catalog at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub column_count: usize,
    pub row_count: u64,
}

/// Metadata for a single column, as reported by `pragma_table_xinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, unique within its table.
    pub name: String,
    /// Declared type; empty for untyped columns.
    pub column_type: String,
    /// Whether `NULL` is accepted.
    pub nullable: bool,
    /// Default value expression as written in the DDL.
    pub default_value: Option<String>,
    /// 1-based position within the primary key, 0 when not part of it.
    pub primary_key_ordinal: u32,
    /// Generated or virtual-table hidden column.
    pub hidden: bool,
}

impl ColumnDescriptor {
    /// Returns `true` when the column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key_ordinal > 0
    }

    /// Type affinity derived from the declared type.
    pub fn affinity(&self) -> Affinity {
        Affinity::from_declared_type(&self.column_type)
    }
}

/// SQLite column type affinity.
///
/// Decides how a value compared against the column is converted first.
/// Columns with [`Affinity::Blob`] (including untyped columns) convert
/// nothing, so a text `'1'` never equals a stored integer `1` there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl Affinity {
    /// Applies SQLite's affinity rules to a declared column type.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlite_admin_core::Affinity;
    ///
    /// assert_eq!(Affinity::from_declared_type("BIGINT"), Affinity::Integer);
    /// assert_eq!(Affinity::from_declared_type("varchar(20)"), Affinity::Text);
    /// assert_eq!(Affinity::from_declared_type(""), Affinity::Blob);
    /// assert_eq!(Affinity::from_declared_type("DOUBLE"), Affinity::Real);
    /// assert_eq!(Affinity::from_declared_type("DECIMAL(10,2)"), Affinity::Numeric);
    /// ```
    pub fn from_declared_type(declared: &str) -> Self {
        let declared = declared.to_ascii_uppercase();
        let has = |needle: &str| declared.contains(needle);
        if has("INT") {
            Affinity::Integer
        } else if has("CHAR") || has("CLOB") || has("TEXT") {
            Affinity::Text
        } else if has("BLOB") || declared.trim().is_empty() {
            Affinity::Blob
        } else if has("REAL") || has("FLOA") || has("DOUB") {
            Affinity::Real
        } else {
            Affinity::Numeric
        }
    }
}

/// Returns the primary-key column names of a table, ordered by key
/// ordinal from highest to lowest.
///
/// This order is the component order of every composite
/// [row identity](crate::compute_identity).
///
/// # Examples
///
/// ```
/// use sqlite_admin_core::{ColumnDescriptor, primary_key_order};
///
/// let column = |name: &str, ordinal: u32| ColumnDescriptor {
///     name: name.to_string(),
///     column_type: "INTEGER".to_string(),
///     nullable: false,
///     default_value: None,
///     primary_key_ordinal: ordinal,
///     hidden: false,
/// };
/// let columns = vec![column("a", 1), column("note", 0), column("b", 2)];
/// assert_eq!(primary_key_order(&columns), vec!["b", "a"]);
/// ```
pub fn primary_key_order(columns: &[ColumnDescriptor]) -> Vec<String> {
    let mut keyed: Vec<&ColumnDescriptor> =
        columns.iter().filter(|c| c.is_primary_key()).collect();
    keyed.sort_by(|a, b| b.primary_key_ordinal.cmp(&a.primary_key_ordinal));
    keyed.into_iter().map(|c| c.name.clone()).collect()
}

/// A table together with its columns and key order, for overview pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOverview {
    pub table: TableDescriptor,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Vec<String>,
}

/// One fetched row: column names paired with values, in select order.
///
/// When the row was selected from a table without an explicit primary
/// key, `rowid` carries its implicit row identifier and the rowid column
/// itself is not part of `columns`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowid: Option<i64>,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column/value pair.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    /// Sets the implicit row identifier.
    pub fn with_rowid(mut self, rowid: i64) -> Self {
        self.rowid = Some(rowid);
        self
    }

    /// Looks up a value by column name.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlite_admin_core::{Row, Value};
    ///
    /// let mut row = Row::new();
    /// row.push("name", "Ann");
    /// assert_eq!(row.get("name"), Some(&Value::Text("Ann".into())));
    /// assert_eq!(row.get("age"), None);
    /// ```
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates `(column, value)` pairs in select order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

/// A row paired with the identity string that addresses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedRow {
    pub identity: String,
    pub row: Row,
}

/// File-level facts about an open database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Canonical absolute path.
    pub filepath: String,
    /// Final path component.
    pub filename: String,
    pub size_bytes: u64,
    /// Human readable size, see [`format_file_size`](crate::format_file_size).
    pub filesize: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_parse_case_insensitive() {
        assert_eq!("varchar".parse::<ColumnType>().unwrap(), ColumnType::Varchar);
        assert_eq!(" DateTime ".parse::<ColumnType>().unwrap(), ColumnType::Datetime);
        assert!(matches!(
            "uuid".parse::<ColumnType>(),
            Err(CoreError::UnknownColumnType(_))
        ));
    }

    #[test]
    fn test_column_type_all_round_trips_through_sql_name() {
        for ty in ColumnType::ALL {
            assert_eq!(ty.as_sql().parse::<ColumnType>().unwrap(), ty);
        }
    }

    fn column(name: &str, ordinal: u32) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            column_type: String::new(),
            nullable: true,
            default_value: None,
            primary_key_ordinal: ordinal,
            hidden: false,
        }
    }

    #[test]
    fn test_primary_key_order_descending_by_ordinal() {
        let columns = vec![column("a", 1), column("b", 2), column("c", 3), column("d", 0)];
        assert_eq!(primary_key_order(&columns), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_primary_key_order_empty_without_key() {
        let columns = vec![column("a", 0), column("b", 0)];
        assert!(primary_key_order(&columns).is_empty());
    }

    #[test]
    fn test_affinity_rules_apply_in_order() {
        // INT wins over CHAR, CHAR over BLOB, BLOB over REAL.
        assert_eq!(Affinity::from_declared_type("CHARINT"), Affinity::Integer);
        assert_eq!(Affinity::from_declared_type("BLOBCHAR"), Affinity::Text);
        assert_eq!(Affinity::from_declared_type("REALBLOB"), Affinity::Blob);
        assert_eq!(Affinity::from_declared_type("float"), Affinity::Real);
        assert_eq!(Affinity::from_declared_type("BOOL"), Affinity::Numeric);
        assert_eq!(Affinity::from_declared_type("DATETIME"), Affinity::Numeric);
        assert_eq!(column("a", 1).affinity(), Affinity::Blob);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "dead");
        assert_eq!(Value::Text("a,b".into()).to_string(), "a,b");
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(Value::from(serde_json::json!(30)), Value::Integer(30));
        assert_eq!(Value::from(serde_json::json!(2.5)), Value::Real(2.5));
        assert_eq!(Value::from(serde_json::json!("Ann")), Value::Text("Ann".into()));
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from(serde_json::json!(true)), Value::Integer(1));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Integer(1), Value::Null, Value::from("x")])
            .unwrap();
        assert_eq!(json, r#"[1,null,"x"]"#);
    }

    #[test]
    fn test_row_lookup_and_iteration() {
        let mut row = Row::new().with_rowid(7);
        row.push("a", 1);
        row.push("b", "two");
        assert_eq!(row.rowid, Some(7));
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("b"), Some(&Value::from("two")));
        let pairs: Vec<_> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(pairs, vec!["a", "b"]);
    }
}
