//! Databases initialized from a prebuilt seed file instead of scripts.
//!
//! The complement to script-driven migration for databases shipped whole:
//! the first open copies the seed database into place, later opens reuse it.
//! Upgrades follow the simplest possible convention — [`SeedFile::replace`]
//! overwrites the live file with the seed wholesale, so any locally written
//! data is lost unless the caller preserves it first.

use std::fs;
use std::io;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// A live database path paired with the seed file that initializes it.
pub struct SeedFile {
    db_path: PathBuf,
    seed_path: PathBuf,
}

impl SeedFile {
    pub fn new(db_path: impl Into<PathBuf>, seed_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            seed_path: seed_path.into(),
        }
    }

    /// Copies the seed into place if no live database exists yet, then
    /// opens a connection to it.
    pub fn open(&self) -> Result<Connection> {
        if !self.exists() {
            self.copy_seed()?;
        }
        Ok(Connection::open(&self.db_path)?)
    }

    /// Whether the live database file exists.
    pub fn exists(&self) -> bool {
        self.db_path.is_file()
    }

    /// Overwrites the live database with the seed. Close all connections
    /// first.
    pub fn replace(&self) -> Result<()> {
        self.copy_seed()
    }

    /// Deletes the live database. Returns whether a file was removed.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.db_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn copy_seed(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(
            "copying seed database '{}' to '{}'",
            self.seed_path.display(),
            self.db_path.display()
        );
        fs::copy(&self.seed_path, &self.db_path)?;
        Ok(())
    }
}
