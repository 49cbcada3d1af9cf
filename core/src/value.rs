//! Storage-level and typed field values.
//!
//! Two value layers mirror the two sides of row mapping: [`SqlValue`] is what
//! the storage engine holds (SQLite's dynamic types), [`FieldValue`] is what
//! a declared field holds. [`FieldType`] selects decode/encode behavior
//! between the two by tag — booleans travel as integer 0/1, timestamps as
//! epoch-millisecond integers, enums as their member name.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Declared column type of a field.
///
/// Nullability is not part of the type tag; it lives on the owning
/// [`FieldSpec`](crate::FieldSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Stored as integer 0/1.
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Text,
    Blob,
    /// An instant, stored as an epoch-millisecond integer.
    Timestamp,
    /// A closed set of symbolic members, stored as the member name.
    Enum(&'static [&'static str]),
}

impl FieldType {
    /// Short name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::Enum(_) => "enum",
        }
    }

    /// The value a freshly constructed record carries for this type.
    ///
    /// Nullable fields start out null; non-nullable fields start at a
    /// type-appropriate zero (false, 0, 0.0, empty text/blob, epoch 0, the
    /// first enum member).
    pub(crate) fn default_value(&self, nullable: bool) -> FieldValue {
        if nullable {
            return FieldValue::Null;
        }
        match self {
            Self::Bool => FieldValue::Bool(false),
            Self::I8 => FieldValue::I8(0),
            Self::I16 => FieldValue::I16(0),
            Self::I32 => FieldValue::I32(0),
            Self::I64 => FieldValue::I64(0),
            Self::F32 => FieldValue::F32(0.0),
            Self::F64 => FieldValue::F64(0.0),
            Self::Text => FieldValue::Text(String::new()),
            Self::Blob => FieldValue::Blob(Vec::new()),
            Self::Timestamp => FieldValue::Timestamp(0),
            Self::Enum(members) => FieldValue::Enum(members[0].to_string()),
        }
    }

    /// Decodes one storage slot into a typed value.
    ///
    /// A null slot decodes to [`FieldValue::Null`] for nullable fields and
    /// fails with [`CoreError::NullNotAllowed`] otherwise. Integer slots
    /// coerce into float fields (SQLite stores integral reals as integers);
    /// every other cross-type read is a [`CoreError::TypeMismatch`].
    pub(crate) fn decode(&self, field: &str, nullable: bool, raw: &SqlValue) -> Result<FieldValue> {
        if matches!(raw, SqlValue::Null) {
            return if nullable {
                Ok(FieldValue::Null)
            } else {
                Err(CoreError::NullNotAllowed(field.to_string()))
            };
        }

        match (self, raw) {
            (Self::Bool, SqlValue::Integer(i)) => Ok(FieldValue::Bool(*i != 0)),
            (Self::I8, SqlValue::Integer(i)) => Ok(FieldValue::I8(*i as i8)),
            (Self::I16, SqlValue::Integer(i)) => Ok(FieldValue::I16(*i as i16)),
            (Self::I32, SqlValue::Integer(i)) => Ok(FieldValue::I32(*i as i32)),
            (Self::I64, SqlValue::Integer(i)) => Ok(FieldValue::I64(*i)),
            (Self::F32, SqlValue::Real(r)) => Ok(FieldValue::F32(*r as f32)),
            (Self::F32, SqlValue::Integer(i)) => Ok(FieldValue::F32(*i as f32)),
            (Self::F64, SqlValue::Real(r)) => Ok(FieldValue::F64(*r)),
            (Self::F64, SqlValue::Integer(i)) => Ok(FieldValue::F64(*i as f64)),
            (Self::Text, SqlValue::Text(s)) => Ok(FieldValue::Text(s.clone())),
            (Self::Blob, SqlValue::Blob(b)) => Ok(FieldValue::Blob(b.clone())),
            (Self::Timestamp, SqlValue::Integer(ms)) => Ok(FieldValue::Timestamp(*ms)),
            (Self::Enum(members), SqlValue::Text(s)) => {
                if members.contains(&s.as_str()) {
                    Ok(FieldValue::Enum(s.clone()))
                } else {
                    Err(CoreError::UnknownEnumMember {
                        field: field.to_string(),
                        value: s.clone(),
                    })
                }
            }
            _ => Err(CoreError::TypeMismatch {
                field: field.to_string(),
                expected: self.name(),
                actual: raw.kind(),
            }),
        }
    }

    /// Validates a typed value against this field type before it is stored
    /// in a record.
    pub(crate) fn check(&self, field: &str, nullable: bool, value: &FieldValue) -> Result<()> {
        if matches!(value, FieldValue::Null) {
            return if nullable {
                Ok(())
            } else {
                Err(CoreError::NullNotAllowed(field.to_string()))
            };
        }

        let tag_matches = matches!(
            (self, value),
            (Self::Bool, FieldValue::Bool(_))
                | (Self::I8, FieldValue::I8(_))
                | (Self::I16, FieldValue::I16(_))
                | (Self::I32, FieldValue::I32(_))
                | (Self::I64, FieldValue::I64(_))
                | (Self::F32, FieldValue::F32(_))
                | (Self::F64, FieldValue::F64(_))
                | (Self::Text, FieldValue::Text(_))
                | (Self::Blob, FieldValue::Blob(_))
                | (Self::Timestamp, FieldValue::Timestamp(_))
                | (Self::Enum(_), FieldValue::Enum(_))
        );
        if !tag_matches {
            return Err(CoreError::TypeMismatch {
                field: field.to_string(),
                expected: self.name(),
                actual: value.kind(),
            });
        }

        if let (Self::Enum(members), FieldValue::Enum(name)) = (self, value) {
            if !members.contains(&name.as_str()) {
                return Err(CoreError::UnknownEnumMember {
                    field: field.to_string(),
                    value: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A storage-level value — exactly the dynamic types SQLite can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A typed field value as held by a [`Record`](crate::Record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Epoch milliseconds.
    Timestamp(i64),
    /// Enum member name.
    Enum(String),
}

impl FieldValue {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Enum(_) => "enum",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Epoch milliseconds of a timestamp value.
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            Self::Timestamp(ms) => Some(*ms),
            _ => None,
        }
    }

    /// Member name of an enum value.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Encodes this typed value into its storage representation.
    pub fn to_sql(&self) -> SqlValue {
        match self {
            Self::Null => SqlValue::Null,
            Self::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Self::I8(v) => SqlValue::Integer(i64::from(*v)),
            Self::I16(v) => SqlValue::Integer(i64::from(*v)),
            Self::I32(v) => SqlValue::Integer(i64::from(*v)),
            Self::I64(v) => SqlValue::Integer(*v),
            Self::F32(v) => SqlValue::Real(f64::from(*v)),
            Self::F64(v) => SqlValue::Real(*v),
            Self::Text(s) => SqlValue::Text(s.clone()),
            Self::Blob(b) => SqlValue::Blob(b.clone()),
            Self::Timestamp(ms) => SqlValue::Integer(*ms),
            Self::Enum(name) => SqlValue::Text(name.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Self::Timestamp(ms) => write!(f, "{ms}ms"),
            Self::Enum(name) => write!(f, "{name}"),
        }
    }
}

/// An owned snapshot of one result row, indexed by column position.
///
/// Every read path materializes rows into `SqlRow`s before returning, so the
/// underlying statement is always released before control leaves the storage
/// layer, on success and error paths alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlRow(Vec<SqlValue>);

impl SqlRow {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self(values)
    }

    pub fn get(&self, column: usize) -> Option<&SqlValue> {
        self.0.get(column)
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SqlValue>> for SqlRow {
    fn from(values: Vec<SqlValue>) -> Self {
        Self(values)
    }
}

/// Converts stored epoch milliseconds into a UTC instant.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimestamp`] if the value is outside the
/// representable range.
pub fn datetime_from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(CoreError::InvalidTimestamp(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &[&str] = &["red", "green", "blue"];

    #[test]
    fn test_bool_decodes_from_integer() {
        let v = FieldType::Bool.decode("flag", false, &SqlValue::Integer(1)).unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v = FieldType::Bool.decode("flag", false, &SqlValue::Integer(0)).unwrap();
        assert_eq!(v, FieldValue::Bool(false));
    }

    #[test]
    fn test_null_rejected_for_non_nullable() {
        let err = FieldType::Text.decode("name", false, &SqlValue::Null).unwrap_err();
        assert!(matches!(err, CoreError::NullNotAllowed(ref f) if f == "name"));
    }

    #[test]
    fn test_null_allowed_for_nullable() {
        let v = FieldType::Text.decode("name", true, &SqlValue::Null).unwrap();
        assert_eq!(v, FieldValue::Null);
    }

    #[test]
    fn test_floats_coerce_from_integers() {
        let v = FieldType::F64.decode("ratio", false, &SqlValue::Integer(2)).unwrap();
        assert_eq!(v, FieldValue::F64(2.0));
    }

    #[test]
    fn test_enum_decodes_known_member() {
        let v = FieldType::Enum(COLORS)
            .decode("color", false, &SqlValue::Text("green".into()))
            .unwrap();
        assert_eq!(v, FieldValue::Enum("green".into()));
    }

    #[test]
    fn test_enum_rejects_unknown_member() {
        let err = FieldType::Enum(COLORS)
            .decode("color", false, &SqlValue::Text("mauve".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownEnumMember { ref value, .. } if value == "mauve"));
    }

    #[test]
    fn test_type_mismatch_reports_both_sides() {
        let err = FieldType::I64.decode("count", false, &SqlValue::Text("7".into())).unwrap_err();
        match err {
            CoreError::TypeMismatch { expected, actual, .. } => {
                assert_eq!(expected, "i64");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_round_trips_every_type() {
        let cases = [
            (FieldType::Bool, FieldValue::Bool(true)),
            (FieldType::I8, FieldValue::I8(-8)),
            (FieldType::I16, FieldValue::I16(-16)),
            (FieldType::I32, FieldValue::I32(-32)),
            (FieldType::I64, FieldValue::I64(-64)),
            (FieldType::F64, FieldValue::F64(2.5)),
            (FieldType::Text, FieldValue::Text("hello".into())),
            (FieldType::Blob, FieldValue::Blob(vec![1, 2, 3])),
            (FieldType::Timestamp, FieldValue::Timestamp(1_700_000_000_000)),
            (FieldType::Enum(COLORS), FieldValue::Enum("blue".into())),
        ];
        for (ty, value) in cases {
            let stored = value.to_sql();
            let decoded = ty.decode("field", false, &stored).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_f32_round_trip() {
        let stored = FieldValue::F32(1.25).to_sql();
        let decoded = FieldType::F32.decode("f", false, &stored).unwrap();
        assert_eq!(decoded, FieldValue::F32(1.25));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FieldType::Text.default_value(true), FieldValue::Null);
        assert_eq!(FieldType::Text.default_value(false), FieldValue::Text(String::new()));
        assert_eq!(FieldType::I32.default_value(false), FieldValue::I32(0));
        assert_eq!(
            FieldType::Enum(COLORS).default_value(false),
            FieldValue::Enum("red".into())
        );
    }

    #[test]
    fn test_check_rejects_cross_type_set() {
        let err = FieldType::I32.check("n", false, &FieldValue::I64(1)).unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn test_sql_row_serde_round_trip() {
        let row = SqlRow::new(vec![
            SqlValue::Integer(1),
            SqlValue::Text("x".into()),
            SqlValue::Blob(vec![0xff]),
            SqlValue::Null,
        ]);
        let json = serde_json::to_string(&row).unwrap();
        let back: SqlRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = datetime_from_millis(0).unwrap();
        assert_eq!(dt.timestamp_millis(), 0);
        let dt = datetime_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }
}
