//! URI-routed CRUD over a SQLite connection.
//!
//! A [`Gateway`] exposes a database through resource addresses of the form
//! `row://namespace[/table[/id]]` and notifies registered observers after
//! reads open and writes land. It gives direct, near-raw access to the
//! underlying database — do not expose one outside its owning process.
//!
//! # Example
//!
//! ```
//! use rowkit_core::{ContentValues, ResourceAddress};
//! use rowkit_sqlite::{Gateway, execute_script};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! execute_script(&conn, "CREATE TABLE tasks (_id INTEGER PRIMARY KEY, title TEXT);").unwrap();
//!
//! let gateway = Gateway::new(conn, "app.demo");
//! let address = gateway.parse("row://app.demo/tasks").unwrap();
//!
//! let created = gateway
//!     .insert(&address, &ContentValues::new().with_text("title", "ship it"))
//!     .unwrap();
//! assert_eq!(created.table_name(), "tasks");
//! assert!(created.id().is_some());
//!
//! let rows = gateway.query(&created, None, None, &[], None).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

use rowkit_core::{ContentValues, CoreError, ID_COLUMN, ResourceAddress, SqlRow, SqlValue};
use rusqlite::{Connection, params_from_iter};
use tracing::trace;

use crate::convert::{self, row_snapshot};
use crate::error::{Result, StoreError};
use crate::store::{Store, checked_identifier, checked_projection};

/// Receives fire-and-forget notifications for a resource address after a
/// gateway operation touches it. Observers run synchronously on the calling
/// thread and cannot fail the operation they follow.
pub trait ChangeObserver {
    fn on_change(&self, address: &ResourceAddress);
}

/// Tuning knobs for [`Gateway`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayOptions {
    /// Permit `query` on a bare-namespace address to execute the caller's
    /// selection text verbatim. This bypasses all routing and validation —
    /// reads only — and is off by default.
    pub allow_raw_queries: bool,
}

/// Routes resource addresses to table-level CRUD calls.
pub struct Gateway {
    conn: Connection,
    namespace: String,
    options: GatewayOptions,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl Gateway {
    pub fn new(conn: Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
            options: GatewayOptions::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: GatewayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The bare-namespace address of this gateway.
    pub fn base_address(&self) -> ResourceAddress {
        ResourceAddress::base(self.namespace.as_str())
    }

    /// The address of a table behind this gateway.
    pub fn table_address(&self, table: &str) -> ResourceAddress {
        ResourceAddress::table(self.namespace.as_str(), table)
    }

    /// Parses an address against this gateway's namespace.
    pub fn parse(&self, uri: &str) -> Result<ResourceAddress> {
        Ok(ResourceAddress::parse(uri, &self.namespace)?)
    }

    /// Registers an observer for all subsequent operations.
    pub fn register_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Runs a read and returns the materialized rows.
    ///
    /// Routing: a bare-namespace address executes `selection` verbatim (the
    /// raw escape hatch, gated by
    /// [`GatewayOptions::allow_raw_queries`]); an address with an id builds
    /// an id-filtered query and ignores `selection`/`args`; otherwise
    /// `selection` becomes the `WHERE` clause with `args` bound to its `?`
    /// placeholders. Observers are notified once the result is open.
    pub fn query(
        &self,
        address: &ResourceAddress,
        projection: Option<&[String]>,
        selection: Option<&str>,
        args: &[SqlValue],
        order: Option<&str>,
    ) -> Result<Vec<SqlRow>> {
        self.check_namespace(address)?;

        let rows = if address.is_raw() {
            if !self.options.allow_raw_queries {
                return Err(StoreError::RawQueryDisabled);
            }
            self.run_query(selection.unwrap_or_default(), args)?
        } else {
            let table = checked_identifier(address.table_name())?;
            let columns = match projection {
                Some(projection) => checked_projection(projection)?,
                None => "*".to_string(),
            };
            let order_by = match order {
                Some(order) if !order.is_empty() => format!(" ORDER BY {order}"),
                _ => String::new(),
            };
            match address.id() {
                Some(id) => {
                    let sql = format!(
                        "SELECT {columns} FROM {table} WHERE {ID_COLUMN} = ?{order_by}"
                    );
                    self.run_query(&sql, &[SqlValue::Integer(id)])?
                }
                None => {
                    let filter = match selection {
                        Some(selection) if !selection.is_empty() => format!(" WHERE {selection}"),
                        _ => String::new(),
                    };
                    let sql = format!("SELECT {columns} FROM {table}{filter}{order_by}");
                    self.run_query(&sql, args)?
                }
            }
        };

        self.notify(address);
        Ok(rows)
    }

    /// Inserts a row at a table address and returns the created row address.
    ///
    /// # Errors
    ///
    /// [`StoreError::TableRequired`] on a bare-namespace address,
    /// [`StoreError::IdNotAllowed`] if the address carries an id.
    pub fn insert(
        &self,
        address: &ResourceAddress,
        values: &ContentValues,
    ) -> Result<ResourceAddress> {
        self.check_namespace(address)?;
        if address.is_raw() {
            return Err(StoreError::TableRequired {
                op: "insert",
                address: address.to_string(),
            });
        }
        if address.id().is_some() {
            return Err(StoreError::IdNotAllowed(address.to_string()));
        }

        let id = self.conn.insert_row(address.table_name(), values)?;
        self.notify(address);
        Ok(address.with_id(id))
    }

    /// Updates rows at an address; returns the affected-row count.
    ///
    /// An id address updates exactly that row, ignoring `selection`;
    /// otherwise `selection` (with `args`) scopes the update, or the whole
    /// table when absent.
    pub fn update(
        &self,
        address: &ResourceAddress,
        values: &ContentValues,
        selection: Option<&str>,
        args: &[SqlValue],
    ) -> Result<usize> {
        self.check_namespace(address)?;
        if address.is_raw() {
            return Err(StoreError::TableRequired {
                op: "update",
                address: address.to_string(),
            });
        }

        let count = match address.id() {
            Some(id) => self.conn.update_by_id(address.table_name(), values, id)?,
            None => {
                let table = checked_identifier(address.table_name())?;
                let mut assignments = Vec::with_capacity(values.len());
                for column in values.columns() {
                    assignments.push(format!("{} = ?", checked_identifier(column)?));
                }
                let filter = match selection {
                    Some(selection) if !selection.is_empty() => format!(" WHERE {selection}"),
                    _ => String::new(),
                };
                let sql = format!("UPDATE {table} SET {}{filter}", assignments.join(", "));
                let params: Vec<rusqlite::types::Value> = values
                    .iter()
                    .map(|(_, value)| convert::to_engine(value))
                    .chain(args.iter().map(convert::to_engine))
                    .collect();
                self.conn.execute(&sql, params_from_iter(params))?
            }
        };

        self.notify(address);
        Ok(count)
    }

    /// Deletes rows at an address; returns the affected-row count.
    ///
    /// An id address deletes exactly that row (parameterized, never spliced
    /// into the SQL text); otherwise `selection` (with `args`) scopes the
    /// delete, or the whole table when absent.
    pub fn delete(
        &self,
        address: &ResourceAddress,
        selection: Option<&str>,
        args: &[SqlValue],
    ) -> Result<usize> {
        self.check_namespace(address)?;
        if address.is_raw() {
            return Err(StoreError::TableRequired {
                op: "delete",
                address: address.to_string(),
            });
        }

        let count = match address.id() {
            Some(id) => self.conn.delete_by_id(address.table_name(), id)?,
            None => {
                let table = checked_identifier(address.table_name())?;
                let filter = match selection {
                    Some(selection) if !selection.is_empty() => format!(" WHERE {selection}"),
                    _ => String::new(),
                };
                let sql = format!("DELETE FROM {table}{filter}");
                self.conn.execute(
                    &sql,
                    params_from_iter(args.iter().map(convert::to_engine)),
                )?
            }
        };

        self.notify(address);
        Ok(count)
    }

    /// Mime-type resolution is intentionally unsupported; generic row
    /// results have no applicable type.
    pub fn content_type(&self, _address: &ResourceAddress) -> Option<&'static str> {
        None
    }

    fn run_query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<SqlRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(args.iter().map(convert::to_engine)))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(row_snapshot(row)?);
        }
        Ok(result)
    }

    fn check_namespace(&self, address: &ResourceAddress) -> Result<()> {
        if address.namespace() != self.namespace {
            return Err(StoreError::Core(CoreError::InvalidAddress(format!(
                "expected namespace '{}', got '{}'",
                self.namespace,
                address.namespace()
            ))));
        }
        Ok(())
    }

    fn notify(&self, address: &ResourceAddress) {
        trace!("notifying {} observers of {address}", self.observers.len());
        for observer in &self.observers {
            observer.on_change(address);
        }
    }
}

impl Store for Gateway {
    fn select_by_id(&self, table: &str, projection: &[String], id: i64) -> Result<Vec<SqlRow>> {
        let address = ResourceAddress::row(self.namespace.as_str(), table, id);
        self.query(&address, Some(projection), None, &[], None)
    }

    fn insert_row(&self, table: &str, values: &ContentValues) -> Result<i64> {
        let created = self.insert(&self.table_address(table), values)?;
        created.id().ok_or_else(|| {
            StoreError::Core(CoreError::InvalidAddress(format!(
                "no id in created address: '{created}'"
            )))
        })
    }

    fn update_by_id(&self, table: &str, values: &ContentValues, id: i64) -> Result<usize> {
        let address = ResourceAddress::row(self.namespace.as_str(), table, id);
        self.update(&address, values, None, &[])
    }

    fn delete_by_id(&self, table: &str, id: i64) -> Result<usize> {
        let address = ResourceAddress::row(self.namespace.as_str(), table, id);
        self.delete(&address, None, &[])
    }
}
