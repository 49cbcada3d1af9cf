//! SQLite binding for the rowkit data-access layer.
//!
//! Everything engine-facing lives here: binding the core value model to
//! rusqlite, running CRUD for records, routing resource addresses, and
//! driving schema migrations.
//!
//! # Architecture
//!
//! - **`store`** — the [`Store`] port (single-table point operations) with
//!   its two implementations, [`rusqlite::Connection`] and [`Gateway`], and
//!   the [`Crud`] engine on [`Record`](rowkit_core::Record) shared by both.
//! - **`gateway`** — URI-routed CRUD (`row://namespace/table/id`) with
//!   change observers and the gated raw-query escape hatch.
//! - **`migration`** — versioned schema creation and upgrades from named
//!   scripts, plus script execution helpers.
//! - **`source`** — the [`ScriptSource`] port resolving script text by name
//!   (directory files or in-memory).
//! - **`seed`** — initializing a database from a prebuilt seed file.
//! - **`convert`** — engine value conversion and row snapshotting.
//!
//! Every operation is synchronous and blocking on the caller's thread;
//! isolation and atomicity are the engine's business. The only transaction
//! boundaries are single statements.
//!
//! # Quick start
//!
//! ```
//! use std::sync::LazyLock;
//! use rowkit_core::{EntitySchema, FieldType, Record};
//! use rowkit_sqlite::{Crud, MemoryScriptSource, Migrator};
//! use rusqlite::Connection;
//!
//! static TASK: LazyLock<EntitySchema> = LazyLock::new(|| {
//!     EntitySchema::builder("app.demo", "tasks")
//!         .field("title", FieldType::Text)
//!         .field("done", FieldType::Bool)
//!         .build()
//! });
//!
//! let source = MemoryScriptSource::new().with(
//!     "create_schema",
//!     "CREATE TABLE tasks (
//!          _id   INTEGER PRIMARY KEY,
//!          title TEXT NOT NULL,
//!          done  INTEGER NOT NULL DEFAULT 0
//!      );",
//! );
//! let conn = Connection::open_in_memory().unwrap();
//! Migrator::new(source, 1).open(&conn).unwrap();
//!
//! let mut task = Record::new(&TASK);
//! task.set_text("title", "write the docs").unwrap();
//! let id = task.create(&conn).unwrap();
//!
//! let mut loaded = Record::new(&TASK);
//! loaded.fetch(&conn, id).unwrap();
//! assert_eq!(loaded, task);
//! ```

mod convert;
mod error;
mod gateway;
mod migration;
mod seed;
mod source;
mod store;

pub use convert::row_snapshot;
pub use error::{Result, StoreError};
pub use gateway::{ChangeObserver, Gateway, GatewayOptions};
pub use migration::{
    CREATE_SCRIPT, MigrationOptions, MigrationStatus, Migrator, MissingUpgrade, execute_script,
    execute_statements, upgrade_script_name,
};
pub use seed::SeedFile;
pub use source::{DirScriptSource, MemoryScriptSource, ScriptSource};
pub use store::{Crud, Store};
