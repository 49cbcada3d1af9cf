//! Conversion between engine values and the core value model.

use rowkit_core::{SqlRow, SqlValue};
use rusqlite::Row;
use rusqlite::types::Value;

use crate::error::Result;

pub(crate) fn from_engine(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Real(r) => SqlValue::Real(r),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    }
}

pub(crate) fn to_engine(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(*i),
        SqlValue::Real(r) => Value::Real(*r),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Blob(b) => Value::Blob(b.clone()),
    }
}

/// Snapshots the positioned row of a live cursor into an owned [`SqlRow`].
///
/// Reading every column up front is what lets the statement be dropped
/// before results leave the storage layer.
pub fn row_snapshot(row: &Row<'_>) -> Result<SqlRow> {
    let width = row.as_ref().column_count();
    let mut values = Vec::with_capacity(width);
    for column in 0..width {
        values.push(from_engine(row.get::<_, Value>(column)?));
    }
    Ok(SqlRow::new(values))
}
