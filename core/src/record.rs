//! Mutable entity records mapped onto table rows.
//!
//! A [`Record`] pairs a static [`EntitySchema`] with one value per field.
//! Decoding reads storage slots in ordinal order from a row snapshot;
//! encoding produces a [`ContentValues`] map covering every field. Both
//! directions share the schema's declaration order, which is what keeps
//! projections and row offsets aligned.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};
use crate::schema::{EntitySchema, ID_COLUMN};
use crate::value::{FieldValue, SqlRow, datetime_from_millis};
use crate::values::ContentValues;

/// One typed, mutable in-memory row of an entity's table.
///
/// Records are exclusively owned by the caller and never cached or shared by
/// the framework. Equality is value-semantic: two records are equal iff they
/// share the same schema and all field values compare equal. There is no
/// `Hash` impl — float fields rule it out, and hashing a mutable row is a
/// trap anyway.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use rowkit_core::{EntitySchema, FieldType, Record};
///
/// static PERSON: LazyLock<EntitySchema> = LazyLock::new(|| {
///     EntitySchema::builder("app.demo", "people")
///         .field("name", FieldType::Text)
///         .nullable("age", FieldType::I32)
///         .build()
/// });
///
/// let mut person = Record::new(&PERSON);
/// person.set_text("name", "Ada").unwrap();
/// person.set_i32("age", 36).unwrap();
///
/// assert_eq!(person.id(), None);
/// assert_eq!(person.get_text("name").unwrap(), Some("Ada"));
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static EntitySchema,
    values: Vec<FieldValue>,
}

impl Record {
    /// A fresh record with default field values (identity unset).
    pub fn new(schema: &'static EntitySchema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| f.ty.default_value(f.nullable))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// All field values in ordinal order.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// The identity value, if this record is bound to a stored row.
    pub fn id(&self) -> Option<i64> {
        self.values[0].as_i64()
    }

    pub fn set_id(&mut self, id: i64) {
        self.values[0] = FieldValue::I64(id);
    }

    /// Unbinds the record from its stored row.
    pub fn clear_id(&mut self) {
        self.values[0] = FieldValue::Null;
    }

    /// The current value of a field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownField`] if the schema has no such field.
    pub fn get(&self, field: &str) -> Result<&FieldValue> {
        let (ordinal, _) = self.lookup(field)?;
        Ok(&self.values[ordinal])
    }

    /// The value at a given ordinal, if in range.
    pub fn get_at(&self, ordinal: usize) -> Option<&FieldValue> {
        self.values.get(ordinal)
    }

    /// Stores a value into a field after validating it against the field's
    /// declared type and nullability.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownField`], [`CoreError::NullNotAllowed`],
    /// [`CoreError::TypeMismatch`], or [`CoreError::UnknownEnumMember`].
    pub fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let (ordinal, spec) = self.lookup(field)?;
        spec.ty.check(spec.name, spec.nullable, &value)?;
        self.values[ordinal] = value;
        Ok(())
    }

    pub fn get_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::Bool(b) => Ok(Some(*b)),
            other => Err(mismatch(field, "bool", other)),
        }
    }

    pub fn get_i32(&self, field: &str) -> Result<Option<i32>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::I32(v) => Ok(Some(*v)),
            other => Err(mismatch(field, "i32", other)),
        }
    }

    pub fn get_i64(&self, field: &str) -> Result<Option<i64>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::I64(v) => Ok(Some(*v)),
            other => Err(mismatch(field, "i64", other)),
        }
    }

    pub fn get_f64(&self, field: &str) -> Result<Option<f64>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::F64(v) => Ok(Some(*v)),
            other => Err(mismatch(field, "f64", other)),
        }
    }

    pub fn get_text(&self, field: &str) -> Result<Option<&str>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::Text(s) => Ok(Some(s)),
            other => Err(mismatch(field, "text", other)),
        }
    }

    pub fn get_blob(&self, field: &str) -> Result<Option<&[u8]>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::Blob(b) => Ok(Some(b)),
            other => Err(mismatch(field, "blob", other)),
        }
    }

    pub fn get_timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::Timestamp(ms) => Ok(Some(datetime_from_millis(*ms)?)),
            other => Err(mismatch(field, "timestamp", other)),
        }
    }

    /// The member name of an enum field.
    pub fn get_enum(&self, field: &str) -> Result<Option<&str>> {
        match self.get(field)? {
            FieldValue::Null => Ok(None),
            FieldValue::Enum(name) => Ok(Some(name)),
            other => Err(mismatch(field, "enum", other)),
        }
    }

    pub fn set_bool(&mut self, field: &str, value: bool) -> Result<()> {
        self.set(field, FieldValue::Bool(value))
    }

    pub fn set_i32(&mut self, field: &str, value: i32) -> Result<()> {
        self.set(field, FieldValue::I32(value))
    }

    pub fn set_i64(&mut self, field: &str, value: i64) -> Result<()> {
        self.set(field, FieldValue::I64(value))
    }

    pub fn set_f64(&mut self, field: &str, value: f64) -> Result<()> {
        self.set(field, FieldValue::F64(value))
    }

    pub fn set_text(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        self.set(field, FieldValue::Text(value.into()))
    }

    pub fn set_blob(&mut self, field: &str, value: impl Into<Vec<u8>>) -> Result<()> {
        self.set(field, FieldValue::Blob(value.into()))
    }

    pub fn set_timestamp(&mut self, field: &str, value: DateTime<Utc>) -> Result<()> {
        self.set(field, FieldValue::Timestamp(value.timestamp_millis()))
    }

    /// Stores an enum member by name; the name must be in the field's
    /// declared member set.
    pub fn set_enum(&mut self, field: &str, member: &str) -> Result<()> {
        self.set(field, FieldValue::Enum(member.to_string()))
    }

    pub fn set_null(&mut self, field: &str) -> Result<()> {
        self.set(field, FieldValue::Null)
    }

    /// Decodes this record from a row snapshot starting at column 0.
    ///
    /// The row's projection must match this schema's field order — that is
    /// the caller's side of the ordinal invariant.
    pub fn decode(&mut self, row: &SqlRow) -> Result<()> {
        self.decode_at(row, 0)
    }

    /// Decodes this record from a row snapshot, reading field `k` from
    /// column `offset + k`. Use for rows spanning multiple tables.
    ///
    /// On error the record is left partially updated and must be considered
    /// invalid by the caller.
    pub fn decode_at(&mut self, row: &SqlRow, offset: usize) -> Result<()> {
        for (ordinal, spec) in self.schema.fields().iter().enumerate() {
            let column = offset + ordinal;
            let raw = row.get(column).ok_or_else(|| CoreError::MissingColumn {
                field: spec.name.to_string(),
                column,
                width: row.len(),
            })?;
            self.values[ordinal] = spec.ty.decode(spec.name, spec.nullable, raw)?;
        }
        Ok(())
    }

    /// Decodes several records from one wide row, in the order given,
    /// advancing the running offset by each record's field count.
    pub fn decode_many(row: &SqlRow, offset: usize, records: &mut [&mut Record]) -> Result<()> {
        let mut column = offset;
        for record in records {
            record.decode_at(row, column)?;
            column += record.schema.field_count();
        }
        Ok(())
    }

    /// Encodes the current state for a single-row write.
    ///
    /// Covers every field in ordinal order; the identity column is included
    /// only when it is set.
    pub fn content_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        for (spec, value) in self.schema.fields().iter().zip(&self.values) {
            if spec.name == ID_COLUMN && value.is_null() {
                continue;
            }
            values.put(spec.name, value.to_sql());
        }
        values
    }

    fn lookup(&self, field: &str) -> Result<(usize, &'static crate::schema::FieldSpec)> {
        self.schema
            .field(field)
            .ok_or_else(|| CoreError::UnknownField(field.to_string()))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.schema.table())?;
        for (index, (spec, value)) in self.schema.fields().iter().zip(&self.values).enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", spec.name, value)?;
        }
        write!(f, "}}")
    }
}

fn mismatch(field: &str, expected: &'static str, actual: &FieldValue) -> CoreError {
    CoreError::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind(),
    }
}
