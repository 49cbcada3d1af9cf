//! Resource-address gateway tour.
//!
//! Shows the URI-routed side of the layer: parsing addresses, inserting and
//! querying through them, observing changes, and the same record CRUD engine
//! running over the gateway port instead of a direct connection.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p rowkit-demos --example gateway_tour
//! ```

use std::sync::LazyLock;

use rowkit_core::{ContentValues, EntitySchema, FieldType, Record, ResourceAddress, SqlValue};
use rowkit_sqlite::{ChangeObserver, Crud, Gateway, MemoryScriptSource, Migrator};
use rusqlite::Connection;

static NOTE: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("app.demo", "notes")
        .field("body", FieldType::Text)
        .field("pinned", FieldType::Bool)
        .build()
});

const CREATE_SQL: &str = "
CREATE TABLE notes (
    _id    INTEGER PRIMARY KEY,
    body   TEXT NOT NULL,
    pinned INTEGER NOT NULL DEFAULT 0
);
";

struct PrintingObserver;

impl ChangeObserver for PrintingObserver {
    fn on_change(&self, address: &ResourceAddress) {
        println!("  [observer] change at {address}");
    }
}

fn main() {
    let source = MemoryScriptSource::new().with("create_schema", CREATE_SQL);
    let conn = Connection::open_in_memory().unwrap();
    Migrator::new(source, 1).open(&conn).unwrap();

    let mut gateway = Gateway::new(conn, "app.demo");
    gateway.register_observer(Box::new(PrintingObserver));

    // === Address parsing ===
    println!("=== Addresses ===");
    let table = gateway.parse("row://app.demo/notes").unwrap();
    println!("table address: {table}");
    match gateway.parse("row://app.demo/notes/not-a-number") {
        Ok(_) => println!("unexpected"),
        Err(e) => println!("rejected bad id: {e}"),
    }

    // === Insert through addresses ===
    println!("\n=== Insert ===");
    let first = gateway
        .insert(
            &table,
            &ContentValues::new()
                .with_text("body", "remember the milk")
                .with_bool("pinned", true),
        )
        .unwrap();
    println!("created {first}");
    gateway
        .insert(
            &table,
            &ContentValues::new().with_text("body", "water the plants"),
        )
        .unwrap();

    // === Query through addresses ===
    println!("\n=== Query ===");
    let rows = gateway
        .query(
            &table,
            Some(&NOTE.projection()),
            Some("pinned = ?"),
            &[SqlValue::Integer(1)],
            Some("body"),
        )
        .unwrap();
    println!("pinned notes: {}", rows.len());

    let mut note = Record::new(&NOTE);
    note.decode(&rows[0]).unwrap();
    println!("decoded: {note}");

    // === The same CRUD engine, routed through the gateway ===
    println!("\n=== Record CRUD over the gateway port ===");
    note.set_text("body", "remember the oat milk").unwrap();
    note.update(&gateway).unwrap();

    let mut reloaded = Record::new(&NOTE);
    reloaded
        .fetch(&gateway, first.id().unwrap())
        .unwrap();
    println!("reloaded: {reloaded}");
}
