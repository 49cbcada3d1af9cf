//! Core data model for the rowkit data-access layer.
//!
//! This crate is storage-engine agnostic: it defines typed row schemas and
//! the conversions between rows and typed values, plus the two small text
//! formats the layer speaks (resource addresses and SQL scripts). The
//! SQLite binding lives in `rowkit-sqlite`.
//!
//! - [`EntitySchema`] / [`FieldSpec`] — the declared, ordered field list of
//!   an entity type. Ordinals are declaration positions; the projection
//!   order and the row decoding order are the same list.
//! - [`Record`] — one mutable in-memory row, with typed accessors, row
//!   decoding (including multi-table rows via [`Record::decode_many`]), and
//!   [`ContentValues`] encoding.
//! - [`SqlValue`] / [`FieldValue`] / [`SqlRow`] — storage-level values,
//!   typed values, and owned row snapshots.
//! - [`ResourceAddress`] — `row://namespace[/table[/id]]` addresses for
//!   routing CRUD calls.
//! - [`split_statements`] — the comment-aware SQL script splitter used by
//!   schema and migration scripts.
//!
//! # Quick start
//!
//! ```
//! use std::sync::LazyLock;
//! use rowkit_core::{EntitySchema, FieldType, Record};
//!
//! static TASK: LazyLock<EntitySchema> = LazyLock::new(|| {
//!     EntitySchema::builder("app.demo", "tasks")
//!         .field("title", FieldType::Text)
//!         .field("done", FieldType::Bool)
//!         .nullable("due", FieldType::Timestamp)
//!         .build()
//! });
//!
//! let mut task = Record::new(&TASK);
//! task.set_text("title", "write docs").unwrap();
//!
//! assert_eq!(TASK.projection(), ["_id", "title", "done", "due"]);
//! assert_eq!(task.content_values().len(), 3); // id unset, omitted
//! ```

mod address;
mod error;
mod record;
mod schema;
mod script;
mod value;
mod values;

pub use address::{ResourceAddress, SCHEME};
pub use error::{CoreError, Result};
pub use record::Record;
pub use schema::{
    EntitySchema, EntitySchemaBuilder, FieldSpec, ID_COLUMN, combine_projections, is_identifier,
};
pub use script::split_statements;
pub use value::{FieldType, FieldValue, SqlRow, SqlValue, datetime_from_millis};
pub use values::ContentValues;
