//! Insertion-ordered column/value maps for single-row writes.

use crate::value::SqlValue;

/// The encoded form of one row write: column names mapped to storage values,
/// in insertion order.
///
/// Putting a value under an existing column replaces it in place, so the
/// column order stays stable. The consuming `with_*` methods allow fluent
/// construction.
///
/// # Examples
///
/// ```
/// use rowkit_core::{ContentValues, SqlValue};
///
/// let values = ContentValues::new()
///     .with_text("name", "Ada")
///     .with_i64("born", 1815)
///     .with_null("died");
///
/// assert_eq!(values.len(), 3);
/// assert_eq!(values.get("born"), Some(&SqlValue::Integer(1815)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    entries: Vec<(String, SqlValue)>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value for a column.
    pub fn put(&mut self, column: impl Into<String>, value: SqlValue) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn put_null(&mut self, column: impl Into<String>) {
        self.put(column, SqlValue::Null);
    }

    /// Removes a column, returning its value if it was present.
    pub fn remove(&mut self, column: &str) -> Option<SqlValue> {
        let index = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies all entries from another map into this one.
    pub fn extend(&mut self, other: &ContentValues) {
        for (column, value) in other.iter() {
            self.put(column, value.clone());
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.put(column, value);
        self
    }

    /// Booleans are stored as integer 0/1.
    pub fn with_bool(self, column: impl Into<String>, value: bool) -> Self {
        self.with(column, SqlValue::Integer(i64::from(value)))
    }

    pub fn with_i64(self, column: impl Into<String>, value: i64) -> Self {
        self.with(column, SqlValue::Integer(value))
    }

    pub fn with_f64(self, column: impl Into<String>, value: f64) -> Self {
        self.with(column, SqlValue::Real(value))
    }

    pub fn with_text(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(column, SqlValue::Text(value.into()))
    }

    pub fn with_blob(self, column: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.with(column, SqlValue::Blob(value.into()))
    }

    pub fn with_null(self, column: impl Into<String>) -> Self {
        self.with(column, SqlValue::Null)
    }
}
