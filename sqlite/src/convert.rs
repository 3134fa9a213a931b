//! Conversion between core values and rusqlite values.

use rusqlite::types::{Value as SqlValue, ValueRef};
use sqlite_admin_core::{ROWID_ALIAS, Row, Value};

/// Converts a core value into an owned rusqlite value for binding.
pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
    }
}

/// Converts a borrowed column value into a core value.
///
/// Text that is not valid UTF-8 is decoded lossily.
pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Reads one result row into a [`Row`].
///
/// A column named [`ROWID_ALIAS`] is lifted into [`Row::rowid`] instead of
/// being kept as a regular column.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, names: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (idx, name) in names.iter().enumerate() {
        let value = row.get_ref(idx)?;
        if name == ROWID_ALIAS {
            if let ValueRef::Integer(rowid) = value {
                out.rowid = Some(rowid);
            }
            continue;
        }
        out.push(name.clone(), from_value_ref(value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_binding_and_reading() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let values = vec![
            Value::Null,
            Value::Integer(-4),
            Value::Real(2.25),
            Value::from("héllo"),
            Value::Blob(vec![0, 1, 2]),
        ];
        for value in values {
            let back: Value = conn
                .query_row("SELECT ?1", [to_sql_value(&value)], |row| {
                    Ok(from_value_ref(row.get_ref(0)?))
                })
                .unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_read_row_lifts_rowid_alias() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare(&format!("SELECT 5 AS \"{ROWID_ALIAS}\", 'x' AS label"))
            .unwrap();
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let row = stmt.query_row([], |r| read_row(r, &names)).unwrap();
        assert_eq!(row.rowid, Some(5));
        assert_eq!(row.columns, vec!["label"]);
        assert_eq!(row.get("label"), Some(&Value::from("x")));
    }
}
