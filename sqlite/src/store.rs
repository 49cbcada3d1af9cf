//! The storage port and the CRUD engine over it.
//!
//! [`Store`] is the narrow surface a record needs for point operations.
//! There are exactly two implementations — a direct [`Connection`] and the
//! address-routed [`Gateway`](crate::Gateway) — and one CRUD engine (the
//! [`Crud`] extension on [`Record`]) shared by both, so the two access paths
//! cannot drift apart.

use rowkit_core::{ContentValues, ID_COLUMN, Record, SqlRow, is_identifier};
use rusqlite::{Connection, params_from_iter};

use crate::convert::{self, row_snapshot};
use crate::error::{Result, StoreError};

/// Single-table point operations against some row store.
pub trait Store {
    /// All rows matching the id under the given projection (0 or 1 for a
    /// well-formed table, since the identity column is unique).
    fn select_by_id(&self, table: &str, projection: &[String], id: i64) -> Result<Vec<SqlRow>>;

    /// Inserts one row and returns the engine-assigned id.
    fn insert_row(&self, table: &str, values: &ContentValues) -> Result<i64>;

    /// Updates the row with the given id; returns the affected-row count.
    fn update_by_id(&self, table: &str, values: &ContentValues, id: i64) -> Result<usize>;

    /// Deletes the row with the given id; returns the affected-row count.
    fn delete_by_id(&self, table: &str, id: i64) -> Result<usize>;
}

/// Rejects names that cannot be safely spliced into SQL as identifiers.
pub(crate) fn checked_identifier(name: &str) -> Result<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(StoreError::BadIdentifier(name.to_string()))
    }
}

/// Validates projection entries (`column`, `table.column`, or `*`) and joins
/// them into a column list.
pub(crate) fn checked_projection(projection: &[String]) -> Result<String> {
    for entry in projection {
        let ok = entry == "*"
            || (entry.split('.').count() <= 2 && entry.split('.').all(is_identifier));
        if !ok {
            return Err(StoreError::BadIdentifier(entry.clone()));
        }
    }
    Ok(projection.join(", "))
}

impl Store for Connection {
    fn select_by_id(&self, table: &str, projection: &[String], id: i64) -> Result<Vec<SqlRow>> {
        let table = checked_identifier(table)?;
        let columns = checked_projection(projection)?;
        let sql = format!("SELECT {columns} FROM {table} WHERE {ID_COLUMN} = ?1");
        let mut stmt = self.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(row_snapshot(row)?);
        }
        Ok(result)
    }

    fn insert_row(&self, table: &str, values: &ContentValues) -> Result<i64> {
        let table = checked_identifier(table)?;
        let sql = if values.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let mut columns = Vec::with_capacity(values.len());
            for column in values.columns() {
                columns.push(checked_identifier(column)?);
            }
            let placeholders = vec!["?"; values.len()];
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        self.execute(
            &sql,
            params_from_iter(values.iter().map(|(_, value)| convert::to_engine(value))),
        )?;
        Ok(self.last_insert_rowid())
    }

    fn update_by_id(&self, table: &str, values: &ContentValues, id: i64) -> Result<usize> {
        let table = checked_identifier(table)?;
        let mut assignments = Vec::with_capacity(values.len());
        for column in values.columns() {
            assignments.push(format!("{} = ?", checked_identifier(column)?));
        }
        let sql = format!(
            "UPDATE {table} SET {} WHERE {ID_COLUMN} = ?",
            assignments.join(", ")
        );
        let params: Vec<rusqlite::types::Value> = values
            .iter()
            .map(|(_, value)| convert::to_engine(value))
            .chain(std::iter::once(rusqlite::types::Value::Integer(id)))
            .collect();
        Ok(self.execute(&sql, params_from_iter(params))?)
    }

    fn delete_by_id(&self, table: &str, id: i64) -> Result<usize> {
        let table = checked_identifier(table)?;
        let sql = format!("DELETE FROM {table} WHERE {ID_COLUMN} = ?1");
        Ok(self.execute(&sql, [id])?)
    }
}

/// Point CRUD for [`Record`]s, generic over the storage port.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use rowkit_core::{EntitySchema, FieldType, Record};
/// use rowkit_sqlite::{Crud, execute_script};
/// use rusqlite::Connection;
///
/// static NOTE: LazyLock<EntitySchema> = LazyLock::new(|| {
///     EntitySchema::builder("app.demo", "notes")
///         .field("body", FieldType::Text)
///         .build()
/// });
///
/// let conn = Connection::open_in_memory().unwrap();
/// execute_script(&conn, "CREATE TABLE notes (_id INTEGER PRIMARY KEY, body TEXT NOT NULL);").unwrap();
///
/// let mut note = Record::new(&NOTE);
/// note.set_text("body", "hello").unwrap();
/// let id = note.create(&conn).unwrap();
///
/// let mut loaded = Record::new(&NOTE);
/// loaded.fetch(&conn, id).unwrap();
/// assert_eq!(loaded, note);
/// ```
pub trait Crud {
    /// Inserts a new row from the current state and adopts the
    /// engine-assigned id. Calling it again creates another row with a new
    /// id.
    fn create(&mut self, store: &dyn Store) -> Result<i64>;

    /// Writes the current state over the row matching the identity.
    ///
    /// # Errors
    ///
    /// [`StoreError::IdNotSet`] if the identity is unset (checked before any
    /// engine call); [`StoreError::RowCount`] if the affected-row count is
    /// not exactly one.
    fn update(&self, store: &dyn Store) -> Result<()>;

    /// Deletes the row matching the identity.
    fn delete(&self, store: &dyn Store) -> Result<()>;

    /// Creates or updates depending on whether the identity is set.
    fn save(&mut self, store: &dyn Store) -> Result<()>;

    /// Loads exactly the row with the given id into `self`.
    ///
    /// # Errors
    ///
    /// [`StoreError::RowCount`] if the row count is not exactly one.
    fn fetch(&mut self, store: &dyn Store, id: i64) -> Result<()>;
}

impl Crud for Record {
    fn create(&mut self, store: &dyn Store) -> Result<i64> {
        let mut values = self.content_values();
        // The engine assigns the identity; a previously adopted one must not
        // ride along into the insert.
        values.remove(ID_COLUMN);
        let id = store.insert_row(self.schema().table(), &values)?;
        self.set_id(id);
        Ok(id)
    }

    fn update(&self, store: &dyn Store) -> Result<()> {
        let id = self.id().ok_or_else(|| StoreError::IdNotSet {
            op: "update",
            table: self.schema().table().to_string(),
        })?;
        let count = store.update_by_id(self.schema().table(), &self.content_values(), id)?;
        if count != 1 {
            return Err(StoreError::RowCount {
                table: self.schema().table().to_string(),
                id,
                count,
            });
        }
        Ok(())
    }

    fn delete(&self, store: &dyn Store) -> Result<()> {
        let id = self.id().ok_or_else(|| StoreError::IdNotSet {
            op: "delete",
            table: self.schema().table().to_string(),
        })?;
        store.delete_by_id(self.schema().table(), id)?;
        Ok(())
    }

    fn save(&mut self, store: &dyn Store) -> Result<()> {
        if self.id().is_some() {
            self.update(store)
        } else {
            self.create(store).map(|_| ())
        }
    }

    fn fetch(&mut self, store: &dyn Store, id: i64) -> Result<()> {
        let rows = store.select_by_id(self.schema().table(), &self.schema().projection(), id)?;
        if rows.len() != 1 {
            return Err(StoreError::RowCount {
                table: self.schema().table().to_string(),
                id,
                count: rows.len(),
            });
        }
        self.decode(&rows[0])?;
        Ok(())
    }
}
