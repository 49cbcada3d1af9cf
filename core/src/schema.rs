//! Static entity schema descriptors.
//!
//! An [`EntitySchema`] is the declared shape of one table row: an ordered
//! list of typed fields, built once per entity type. Field ordinals are
//! assigned by declaration position, which ties the projection order and the
//! row decoding order together by construction — the central invariant of
//! this crate.

use crate::address::ResourceAddress;
use crate::value::FieldType;

/// Name of the identity column, fixed and reserved across all entities.
pub const ID_COLUMN: &str = "_id";

/// Returns true if the name is safe to splice into SQL as an identifier
/// (non-empty, ASCII alphanumerics and underscores only).
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One typed, named, ordinal-positioned column descriptor.
///
/// The ordinal is not stored here; it is the field's position within the
/// owning [`EntitySchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
}

/// The declared, ordered field list of one entity type.
///
/// Built once per type via [`EntitySchema::builder`] and typically held in a
/// `static`. The identity field ([`ID_COLUMN`], nullable i64) is injected at
/// ordinal 0; application fields follow in declaration order.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use rowkit_core::{EntitySchema, FieldType};
///
/// static PERSON: LazyLock<EntitySchema> = LazyLock::new(|| {
///     EntitySchema::builder("app.demo", "people")
///         .field("name", FieldType::Text)
///         .nullable("age", FieldType::I32)
///         .build()
/// });
///
/// assert_eq!(PERSON.projection(), ["_id", "name", "age"]);
/// assert_eq!(PERSON.field_count(), 3);
/// ```
#[derive(Debug)]
pub struct EntitySchema {
    namespace: &'static str,
    table: &'static str,
    fields: Vec<FieldSpec>,
}

impl EntitySchema {
    /// Starts a builder for the given namespace and table.
    pub fn builder(namespace: &'static str, table: &'static str) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            namespace,
            table,
            fields: vec![FieldSpec {
                name: ID_COLUMN,
                ty: FieldType::I64,
                nullable: true,
            }],
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// All fields in ordinal order, identity field first.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of fields, equal to the length of a full projection.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Looks up a field and its ordinal by name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }

    /// The ordered list of column names for a full-row query.
    pub fn projection(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.to_string()).collect()
    }

    /// The projection with every column prefixed `"<prefix>.<name>"`, for
    /// disambiguation in multi-table queries.
    pub fn prefixed_projection(&self, prefix: &str) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| format!("{prefix}.{}", f.name))
            .collect()
    }

    /// The resource address of this entity's table.
    pub fn base_address(&self) -> ResourceAddress {
        ResourceAddress::table(self.namespace, self.table)
    }

    /// The resource address of one row of this entity's table.
    pub fn row_address(&self, id: i64) -> ResourceAddress {
        ResourceAddress::row(self.namespace, self.table, id)
    }
}

/// Builder for [`EntitySchema`]; fields are appended in declaration order.
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    namespace: &'static str,
    table: &'static str,
    fields: Vec<FieldSpec>,
}

impl EntitySchemaBuilder {
    /// Appends a non-nullable field.
    pub fn field(self, name: &'static str, ty: FieldType) -> Self {
        self.push(name, ty, false)
    }

    /// Appends a nullable field.
    pub fn nullable(self, name: &'static str, ty: FieldType) -> Self {
        self.push(name, ty, true)
    }

    fn push(mut self, name: &'static str, ty: FieldType, nullable: bool) -> Self {
        self.fields.push(FieldSpec { name, ty, nullable });
        self
    }

    /// Finalizes the schema.
    ///
    /// # Panics
    ///
    /// Schema declarations are definition-time code, so structural mistakes
    /// panic rather than surface as runtime errors: an invalid table or
    /// column identifier, a duplicate column name, use of the reserved
    /// [`ID_COLUMN`] name, or an enum field with an empty member set.
    pub fn build(self) -> EntitySchema {
        assert!(
            is_identifier(self.table),
            "invalid table name: '{}'",
            self.table
        );
        for (ordinal, spec) in self.fields.iter().enumerate() {
            assert!(
                is_identifier(spec.name),
                "invalid column name: '{}'",
                spec.name
            );
            assert!(
                ordinal == 0 || spec.name != ID_COLUMN,
                "'{ID_COLUMN}' is reserved for the identity field"
            );
            assert!(
                self.fields[..ordinal].iter().all(|f| f.name != spec.name),
                "duplicate column name: '{}'",
                spec.name
            );
            if let FieldType::Enum(members) = spec.ty {
                assert!(
                    !members.is_empty(),
                    "enum field '{}' has no members",
                    spec.name
                );
            }
        }
        EntitySchema {
            namespace: self.namespace,
            table: self.table,
            fields: self.fields,
        }
    }
}

/// Joins several projections into one, for queries spanning multiple tables.
pub fn combine_projections(parts: &[Vec<String>]) -> Vec<String> {
    parts.iter().flat_map(|p| p.iter().cloned()).collect()
}
