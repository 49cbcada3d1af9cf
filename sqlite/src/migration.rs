//! Versioned schema creation and upgrades driven by named scripts.
//!
//! The schema version lives in SQLite's `user_version` pragma. On open, the
//! runner verifies foreign-key enforcement, creates the schema from the
//! [`CREATE_SCRIPT`] when the version is 0, and otherwise walks the upgrade
//! scripts one version at a time. Multi-statement scripts are NOT wrapped in
//! a transaction: a mid-script failure leaves the statements that already
//! ran applied and the version unstamped.
//!
//! # Example
//!
//! ```no_run
//! use rowkit_sqlite::{DirScriptSource, Migrator};
//!
//! let migrator = Migrator::new(DirScriptSource::new("db/scripts"), 3);
//! let conn = migrator.open_file("app.db").unwrap();
//!
//! let status = migrator.status(&conn).unwrap();
//! assert!(status.is_current());
//! ```

use std::path::Path;

use rowkit_core::split_statements;
use rusqlite::{Connection, MAIN_DB};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::source::ScriptSource;

/// Name of the script that creates the initial schema.
pub const CREATE_SCRIPT: &str = "create_schema";

/// Name of the script performing the transition to the given version.
pub fn upgrade_script_name(version: u32) -> String {
    format!("upgrade_schema_{version}")
}

/// Splits a script with [`split_statements`] and executes each statement in
/// sequence.
///
/// Failure on a statement aborts the remaining ones and surfaces the engine
/// error; no rollback is performed here.
pub fn execute_script(conn: &Connection, script: &str) -> Result<()> {
    execute_statements(conn, split_statements(script).iter().map(String::as_str))
}

/// Executes pre-split statements in order, skipping empty ones.
pub fn execute_statements<'a>(
    conn: &Connection,
    statements: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for statement in statements {
        if statement.trim().is_empty() {
            continue;
        }
        conn.execute_batch(statement)?;
    }
    Ok(())
}

/// What to do when a version's upgrade script cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingUpgrade {
    /// Skip the version silently and continue — a version bump without a
    /// schema-affecting change needs no script. The default, and a real
    /// risk: a misnamed script is skipped just as quietly.
    #[default]
    Skip,
    /// Fail with [`StoreError::ScriptNotFound`].
    Fail,
}

/// Tuning knobs for [`Migrator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    pub on_missing_upgrade: MissingUpgrade,
}

/// Applies the initial schema and sequential version upgrades.
pub struct Migrator<S> {
    source: S,
    target_version: u32,
    options: MigrationOptions,
}

impl<S: ScriptSource> Migrator<S> {
    /// Creates a runner targeting the given schema version.
    ///
    /// # Panics
    ///
    /// Panics if `target_version` is 0; version 0 means "not yet created".
    pub fn new(source: S, target_version: u32) -> Self {
        assert!(target_version >= 1, "target schema version must be >= 1");
        Self {
            source,
            target_version,
            options: MigrationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn target_version(&self) -> u32 {
        self.target_version
    }

    /// Brings the connected database to the target schema version.
    ///
    /// Order of operations: foreign-key verification, then creation (stored
    /// version 0) or the upgrade walk (stored < target). The stored version
    /// is stamped only after every script has executed.
    ///
    /// # Errors
    ///
    /// [`StoreError::ForeignKeysUnsupported`] / [`StoreError::ReadOnly`]
    /// from the verification step; [`StoreError::ScriptNotFound`] if the
    /// creation script is missing (or an upgrade script is, under
    /// [`MissingUpgrade::Fail`]); [`StoreError::Migration`] wrapping the
    /// failing version and script name; [`StoreError::Downgrade`] if the
    /// stored version is newer than the target.
    pub fn open(&self, conn: &Connection) -> Result<()> {
        ensure_foreign_keys(conn)?;

        let stored = stored_version(conn)?;
        if stored == 0 {
            let script = self
                .source
                .load(CREATE_SCRIPT)?
                .ok_or_else(|| StoreError::ScriptNotFound(CREATE_SCRIPT.to_string()))?;
            execute_script(conn, &script)?;
            set_stored_version(conn, self.target_version)?;
            debug!("schema created at version {}", self.target_version);
            return Ok(());
        }
        if stored > self.target_version {
            return Err(StoreError::Downgrade {
                stored,
                target: self.target_version,
            });
        }
        if stored == self.target_version {
            return Ok(());
        }

        for version in (stored + 1)..=self.target_version {
            let script_name = upgrade_script_name(version);
            match self.source.load(&script_name)? {
                None => match self.options.on_missing_upgrade {
                    MissingUpgrade::Skip => {
                        debug!("skipping upgrade to version {version}, script '{script_name}' not found");
                    }
                    MissingUpgrade::Fail => return Err(StoreError::ScriptNotFound(script_name)),
                },
                Some(script) => {
                    execute_script(conn, &script).map_err(|e| StoreError::Migration {
                        version,
                        script: script_name.clone(),
                        source: Box::new(e),
                    })?;
                    debug!("schema upgraded to version {version}");
                }
            }
        }
        set_stored_version(conn, self.target_version)?;
        Ok(())
    }

    /// Opens (creating if necessary) a database file and runs [`open`](Self::open) on it.
    pub fn open_file(&self, path: impl AsRef<Path>) -> Result<Connection> {
        let conn = Connection::open(path)?;
        self.open(&conn)?;
        Ok(conn)
    }

    /// Reports the stored and target versions without mutating anything.
    pub fn status(&self, conn: &Connection) -> Result<MigrationStatus> {
        Ok(MigrationStatus {
            stored_version: stored_version(conn)?,
            target_version: self.target_version,
            foreign_keys: foreign_keys_enabled(conn)?,
        })
    }
}

/// Snapshot of a database's migration state.
#[derive(Debug, Clone, Copy)]
pub struct MigrationStatus {
    pub stored_version: u32,
    pub target_version: u32,
    /// Whether the connection currently enforces foreign keys.
    pub foreign_keys: bool,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.stored_version == self.target_version
    }
}

/// Verifies the engine supports foreign keys and turns enforcement on.
///
/// `PRAGMA foreign_keys` returning no row means the engine was compiled
/// without foreign key support — fatal. Returning 0 means enforcement is
/// off; it is enabled unless the connection is read-only, which is fatal
/// too: missing referential integrity is never silently accepted.
fn ensure_foreign_keys(conn: &Connection) -> Result<()> {
    let enabled: i64 = match conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)) {
        Ok(value) => value,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(StoreError::ForeignKeysUnsupported);
        }
        Err(e) => return Err(e.into()),
    };
    if enabled == 0 {
        if conn.is_readonly(MAIN_DB)? {
            return Err(StoreError::ReadOnly);
        }
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    }
    Ok(())
}

fn foreign_keys_enabled(conn: &Connection) -> Result<bool> {
    match conn.query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0)) {
        Ok(value) => Ok(value != 0),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn stored_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version as u32)
}

fn set_stored_version(conn: &Connection, version: u32) -> Result<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}
