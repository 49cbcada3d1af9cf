//! Pluggable resolution of schema scripts by name.
//!
//! The migration runner addresses scripts by convention
//! ([`CREATE_SCRIPT`](crate::CREATE_SCRIPT), `upgrade_schema_<version>`);
//! where the text comes from is this port's business. `Ok(None)` means "no
//! such script", which the runner may treat as skippable — an unreadable
//! script is an error, never a skip.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use crate::error::Result;

/// Resolves schema/migration script text by name.
pub trait ScriptSource {
    /// Loads the script with the given name, or `Ok(None)` if it does not
    /// exist.
    fn load(&self, name: &str) -> Result<Option<String>>;
}

/// Loads scripts from `<dir>/<name>.sql` files.
///
/// # Examples
///
/// ```no_run
/// use rowkit_sqlite::{DirScriptSource, ScriptSource};
///
/// let source = DirScriptSource::new("db/scripts");
/// let script = source.load("create_schema").unwrap();
/// assert!(script.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DirScriptSource {
    dir: PathBuf,
}

impl DirScriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ScriptSource for DirScriptSource {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir.join(format!("{name}.sql"));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Scripts registered in memory, for tests and embedded schemas.
///
/// # Examples
///
/// ```
/// use rowkit_sqlite::{MemoryScriptSource, ScriptSource};
///
/// let source = MemoryScriptSource::new()
///     .with("create_schema", "CREATE TABLE t (_id INTEGER PRIMARY KEY);");
/// assert!(source.load("create_schema").unwrap().is_some());
/// assert!(source.load("upgrade_schema_2").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryScriptSource {
    scripts: HashMap<String, String>,
}

impl MemoryScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.scripts.insert(name.into(), text.into());
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl ScriptSource for MemoryScriptSource {
    fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(self.scripts.get(name).cloned())
    }
}
