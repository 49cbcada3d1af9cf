//! Entity CRUD workflow example.
//!
//! Demonstrates the complete lifecycle: declaring a schema, migrating an
//! in-memory database, and running create/fetch/update/delete through the
//! record CRUD engine.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p rowkit-demos --example entity_crud
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use rowkit_core::{EntitySchema, FieldType, Record};
use rowkit_sqlite::{Crud, MemoryScriptSource, Migrator};
use rusqlite::Connection;

const PRIORITIES: &[&str] = &["low", "normal", "high"];

static TASK: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("app.demo", "tasks")
        .field("title", FieldType::Text)
        .field("done", FieldType::Bool)
        .field("priority", FieldType::Enum(PRIORITIES))
        .nullable("due", FieldType::Timestamp)
        .build()
});

const CREATE_SQL: &str = "
CREATE TABLE tasks (
    _id      INTEGER PRIMARY KEY,
    title    TEXT NOT NULL,
    done     INTEGER NOT NULL DEFAULT 0,
    priority TEXT NOT NULL DEFAULT 'normal',
    due      INTEGER
);
";

fn main() {
    // === Step 1: Migrate a fresh database ===
    println!("=== Migration ===");
    let source = MemoryScriptSource::new().with("create_schema", CREATE_SQL);
    let migrator = Migrator::new(source, 1);
    let conn = Connection::open_in_memory().unwrap();
    migrator.open(&conn).unwrap();
    let status = migrator.status(&conn).unwrap();
    println!(
        "Schema at version {}, foreign keys {}",
        status.stored_version,
        if status.foreign_keys { "on" } else { "off" }
    );

    // === Step 2: Create ===
    println!("\n=== Create ===");
    let mut task = Record::new(&TASK);
    task.set_text("title", "write the demo").unwrap();
    task.set_enum("priority", "high").unwrap();
    task.set_timestamp("due", Utc::now()).unwrap();
    let id = task.create(&conn).unwrap();
    println!("Created {task}");

    // === Step 3: Fetch ===
    println!("\n=== Fetch ===");
    let mut loaded = Record::new(&TASK);
    loaded.fetch(&conn, id).unwrap();
    println!("Loaded  {loaded}");
    assert_eq!(loaded, task);

    // === Step 4: Update ===
    println!("\n=== Update ===");
    loaded.set_bool("done", true).unwrap();
    loaded.update(&conn).unwrap();
    println!("Updated {loaded}");

    // === Step 5: Delete ===
    println!("\n=== Delete ===");
    loaded.delete(&conn).unwrap();
    let mut gone = Record::new(&TASK);
    println!(
        "Fetch after delete: {}",
        match gone.fetch(&conn, id) {
            Ok(()) => "still there?!".to_string(),
            Err(e) => e.to_string(),
        }
    );
}
