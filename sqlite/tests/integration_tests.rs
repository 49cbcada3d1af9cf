//! Integration tests for the rowkit-sqlite crate.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use rowkit_core::{
    ContentValues, EntitySchema, FieldType, Record, ResourceAddress, SqlValue, combine_projections,
};
use rowkit_sqlite::{
    ChangeObserver, Crud, DirScriptSource, Gateway, GatewayOptions, MemoryScriptSource,
    MigrationOptions, Migrator, MissingUpgrade, Store, StoreError, execute_script, row_snapshot,
};
use rusqlite::{Connection, OpenFlags};

const PRIORITIES: &[&str] = &["low", "normal", "high"];

static TASK: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("app.test", "tasks")
        .field("title", FieldType::Text)
        .field("done", FieldType::Bool)
        .field("priority", FieldType::Enum(PRIORITIES))
        .nullable("due", FieldType::Timestamp)
        .nullable("effort", FieldType::F64)
        .build()
});

static TAG: LazyLock<EntitySchema> = LazyLock::new(|| {
    EntitySchema::builder("app.test", "tags")
        .field("task_id", FieldType::I64)
        .field("label", FieldType::Text)
        .build()
});

const CREATE_SQL: &str = "
-- task tracker schema
CREATE TABLE tasks (
    _id      INTEGER PRIMARY KEY,
    title    TEXT NOT NULL,
    done     INTEGER NOT NULL DEFAULT 0,
    priority TEXT NOT NULL DEFAULT 'normal',
    due      INTEGER,
    effort   REAL
);

/* tags reference their task; referential integrity is enforced
   because the migrator turns foreign keys on */
CREATE TABLE tags (
    _id     INTEGER PRIMARY KEY,
    task_id INTEGER NOT NULL REFERENCES tasks(_id) ON DELETE CASCADE,
    label   TEXT NOT NULL
);
";

/// Opens an in-memory database with the schema applied.
fn open_db() -> Connection {
    let source = MemoryScriptSource::new().with("create_schema", CREATE_SQL);
    let conn = Connection::open_in_memory().unwrap();
    Migrator::new(source, 1).open(&conn).unwrap();
    conn
}

/// A task record with every non-nullable field set.
fn sample_task(title: &str) -> Record {
    let mut task = Record::new(&TASK);
    task.set_text("title", title).unwrap();
    task.set_bool("done", false).unwrap();
    task.set_enum("priority", "high").unwrap();
    task.set_f64("effort", 1.5).unwrap();
    task
}

#[test]
fn test_create_fetch_round_trip() {
    let conn = open_db();
    let mut task = sample_task("write tests");
    let id = task.create(&conn).unwrap();
    assert_eq!(task.id(), Some(id));

    let mut loaded = Record::new(&TASK);
    loaded.fetch(&conn, id).unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.get_enum("priority").unwrap(), Some("high"));
    assert_eq!(loaded.get_timestamp("due").unwrap(), None);
}

#[test]
fn test_create_twice_yields_distinct_ids() {
    let conn = open_db();
    let mut task = sample_task("twin");
    let first = task.create(&conn).unwrap();
    let second = task.create(&conn).unwrap();
    assert_ne!(first, second);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_update_changes_exactly_one_row() {
    let conn = open_db();
    let mut task = sample_task("before");
    let id = task.create(&conn).unwrap();
    sample_task("other").create(&conn).unwrap();

    task.set_text("title", "after").unwrap();
    task.set_bool("done", true).unwrap();
    task.update(&conn).unwrap();

    let mut loaded = Record::new(&TASK);
    loaded.fetch(&conn, id).unwrap();
    assert_eq!(loaded.get_text("title").unwrap(), Some("after"));
    assert_eq!(loaded.get_bool("done").unwrap(), Some(true));

    // The other row is untouched.
    let others: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks WHERE title = 'other'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(others, 1);
}

#[test]
fn test_update_of_vanished_row_is_a_cardinality_error() {
    let conn = open_db();
    let mut task = sample_task("gone");
    let id = task.create(&conn).unwrap();
    conn.execute("DELETE FROM tasks WHERE _id = ?1", [id]).unwrap();

    let err = task.update(&conn).unwrap_err();
    assert!(matches!(err, StoreError::RowCount { count: 0, .. }));
}

/// A store that fails the test if any engine call is made through it.
struct ExplodingStore;

impl Store for ExplodingStore {
    fn select_by_id(&self, _: &str, _: &[String], _: i64) -> rowkit_sqlite::Result<Vec<rowkit_core::SqlRow>> {
        panic!("engine call after contract violation");
    }
    fn insert_row(&self, _: &str, _: &ContentValues) -> rowkit_sqlite::Result<i64> {
        panic!("engine call after contract violation");
    }
    fn update_by_id(&self, _: &str, _: &ContentValues, _: i64) -> rowkit_sqlite::Result<usize> {
        panic!("engine call after contract violation");
    }
    fn delete_by_id(&self, _: &str, _: i64) -> rowkit_sqlite::Result<usize> {
        panic!("engine call after contract violation");
    }
}

#[test]
fn test_update_and_delete_require_id_before_any_engine_call() {
    let task = sample_task("no id yet");
    assert!(matches!(
        task.update(&ExplodingStore).unwrap_err(),
        StoreError::IdNotSet { op: "update", .. }
    ));
    assert!(matches!(
        task.delete(&ExplodingStore).unwrap_err(),
        StoreError::IdNotSet { op: "delete", .. }
    ));
}

#[test]
fn test_fetch_missing_id_is_a_cardinality_error() {
    let conn = open_db();
    let mut task = Record::new(&TASK);
    let err = task.fetch(&conn, 4711).unwrap_err();
    assert!(matches!(err, StoreError::RowCount { id: 4711, count: 0, .. }));
}

#[test]
fn test_save_dispatches_on_identity() {
    let conn = open_db();
    let mut task = sample_task("saved");
    task.save(&conn).unwrap();
    let id = task.id().expect("save must create");

    task.set_text("title", "saved again").unwrap();
    task.save(&conn).unwrap();
    assert_eq!(task.id(), Some(id));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_delete_removes_row() {
    let conn = open_db();
    let mut task = sample_task("doomed");
    let id = task.create(&conn).unwrap();
    task.delete(&conn).unwrap();

    let mut reloaded = Record::new(&TASK);
    assert!(reloaded.fetch(&conn, id).is_err());
}

#[test]
fn test_timestamp_round_trip_through_engine() {
    let conn = open_db();
    let due = rowkit_core::datetime_from_millis(1_700_000_000_000).unwrap();

    let mut task = sample_task("dated");
    task.set_timestamp("due", due).unwrap();
    let id = task.create(&conn).unwrap();

    let mut loaded = Record::new(&TASK);
    loaded.fetch(&conn, id).unwrap();
    assert_eq!(loaded.get_timestamp("due").unwrap(), Some(due));
}

#[test]
fn test_unknown_enum_member_in_storage_fails_decode() {
    let conn = open_db();
    conn.execute(
        "INSERT INTO tasks (title, done, priority) VALUES ('bad', 0, 'urgent')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let mut task = Record::new(&TASK);
    let err = task.fetch(&conn, id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(rowkit_core::CoreError::UnknownEnumMember { .. })
    ));
}

#[test]
fn test_decode_many_from_join_row() {
    let conn = open_db();
    let mut task = sample_task("tagged");
    let task_id = task.create(&conn).unwrap();

    let mut tag = Record::new(&TAG);
    tag.set_i64("task_id", task_id).unwrap();
    tag.set_text("label", "urgent").unwrap();
    tag.create(&conn).unwrap();

    let projection = combine_projections(&[
        TASK.prefixed_projection("t"),
        TAG.prefixed_projection("g"),
    ]);
    let sql = format!(
        "SELECT {} FROM tasks t JOIN tags g ON g.task_id = t._id",
        projection.join(", ")
    );
    let row = conn
        .query_row(&sql, [], |row| {
            row_snapshot(row).map_err(|_| rusqlite::Error::InvalidQuery)
        })
        .unwrap();

    let mut joined_task = Record::new(&TASK);
    let mut joined_tag = Record::new(&TAG);
    Record::decode_many(&row, 0, &mut [&mut joined_task, &mut joined_tag]).unwrap();

    assert_eq!(joined_task, task);
    assert_eq!(joined_tag.get_text("label").unwrap(), Some("urgent"));
    assert_eq!(joined_tag.get_i64("task_id").unwrap(), Some(task_id));
}

#[test]
fn test_foreign_keys_are_enforced_after_open() {
    let conn = open_db();
    // No task with id 999: the reference must be rejected.
    let result = conn.execute(
        "INSERT INTO tags (task_id, label) VALUES (999, 'dangling')",
        [],
    );
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

fn open_gateway() -> Gateway {
    Gateway::new(open_db(), "app.test")
}

#[test]
fn test_gateway_crud_matches_direct_crud() {
    // The same engine backs both access paths; a record written through the
    // gateway port must read back identically through it.
    let gateway = open_gateway();

    let mut task = sample_task("via gateway");
    let id = task.create(&gateway).unwrap();

    let mut loaded = Record::new(&TASK);
    loaded.fetch(&gateway, id).unwrap();
    assert_eq!(loaded, task);

    loaded.set_bool("done", true).unwrap();
    loaded.update(&gateway).unwrap();

    let mut again = Record::new(&TASK);
    again.fetch(&gateway, id).unwrap();
    assert_eq!(again.get_bool("done").unwrap(), Some(true));

    again.delete(&gateway).unwrap();
    assert!(Record::new(&TASK).fetch(&gateway, id).is_err());
}

#[test]
fn test_raw_query_escape_hatch() {
    let gateway = Gateway::new(open_db(), "app.test").with_options(GatewayOptions {
        allow_raw_queries: true,
    });
    let address = gateway.table_address("tasks");
    for title in ["a", "b"] {
        gateway
            .insert(
                &address,
                &ContentValues::new()
                    .with_text("title", title)
                    .with_bool("done", false)
                    .with_text("priority", "low"),
            )
            .unwrap();
    }

    let rows = gateway
        .query(
            &gateway.base_address(),
            None,
            Some("SELECT COUNT(*) FROM tasks WHERE done = ?"),
            &[SqlValue::Integer(0)],
            None,
        )
        .unwrap();
    assert_eq!(rows[0].get(0), Some(&SqlValue::Integer(2)));
}

#[test]
fn test_gateway_query_by_id_ignores_selection() {
    let gateway = open_gateway();
    let address = gateway.table_address("tasks");
    let created = gateway
        .insert(
            &address,
            &ContentValues::new()
                .with_text("title", "a")
                .with_bool("done", false)
                .with_text("priority", "low"),
        )
        .unwrap();

    // The selection would exclude the row; the id route must win.
    let rows = gateway
        .query(
            &created,
            Some(&TASK.projection()),
            Some("title = ?"),
            &[SqlValue::Text("nope".into())],
            None,
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_gateway_filtered_query_and_order() {
    let gateway = open_gateway();
    let address = gateway.table_address("tasks");
    for (title, done) in [("b", true), ("a", true), ("c", false)] {
        gateway
            .insert(
                &address,
                &ContentValues::new()
                    .with_text("title", title)
                    .with_bool("done", done)
                    .with_text("priority", "normal"),
            )
            .unwrap();
    }

    let rows = gateway
        .query(
            &address,
            Some(&["title".to_string()]),
            Some("done = ?"),
            &[SqlValue::Integer(1)],
            Some("title"),
        )
        .unwrap();
    let titles: Vec<_> = rows
        .iter()
        .map(|row| row.get(0).cloned().unwrap())
        .collect();
    assert_eq!(
        titles,
        [SqlValue::Text("a".into()), SqlValue::Text("b".into())]
    );
}

#[test]
fn test_gateway_update_and_delete_by_selection() {
    let gateway = open_gateway();
    let address = gateway.table_address("tasks");
    for title in ["x", "y", "z"] {
        gateway
            .insert(
                &address,
                &ContentValues::new()
                    .with_text("title", title)
                    .with_bool("done", false)
                    .with_text("priority", "normal"),
            )
            .unwrap();
    }

    let updated = gateway
        .update(
            &address,
            &ContentValues::new().with_bool("done", true),
            Some("title != ?"),
            &[SqlValue::Text("z".into())],
        )
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = gateway
        .delete(&address, Some("done = ?"), &[SqlValue::Integer(1)])
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = gateway.query(&address, None, None, &[], None).unwrap();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn test_gateway_delete_by_id_address() {
    let gateway = open_gateway();
    let address = gateway.table_address("tasks");
    let created = gateway
        .insert(
            &address,
            &ContentValues::new()
                .with_text("title", "one")
                .with_bool("done", false)
                .with_text("priority", "low"),
        )
        .unwrap();

    // The selection is ignored on an id address.
    let deleted = gateway.delete(&created, Some("title = 'other'"), &[]).unwrap();
    assert_eq!(deleted, 1);
}

#[test]
fn test_gateway_write_ops_require_table() {
    let gateway = open_gateway();
    let base = gateway.base_address();
    let values = ContentValues::new().with_text("title", "t");

    assert!(matches!(
        gateway.insert(&base, &values).unwrap_err(),
        StoreError::TableRequired { op: "insert", .. }
    ));
    assert!(matches!(
        gateway.update(&base, &values, None, &[]).unwrap_err(),
        StoreError::TableRequired { op: "update", .. }
    ));
    assert!(matches!(
        gateway.delete(&base, None, &[]).unwrap_err(),
        StoreError::TableRequired { op: "delete", .. }
    ));
}

#[test]
fn test_gateway_parse_uses_configured_namespace() {
    let gateway = open_gateway();
    let address = gateway.parse("row://app.test/tasks/3").unwrap();
    assert_eq!(address.table_name(), "tasks");
    assert_eq!(address.id(), Some(3));

    assert!(gateway.parse("row://elsewhere/tasks").is_err());
    assert!(gateway.parse("row://app.test/tasks/3/4").is_err());
}

#[test]
fn test_gateway_content_type_is_unsupported() {
    let gateway = open_gateway();
    assert_eq!(gateway.content_type(&gateway.base_address()), None);
}

#[derive(Default)]
struct RecordingObserver {
    seen: Rc<RefCell<Vec<String>>>,
}

impl ChangeObserver for RecordingObserver {
    fn on_change(&self, address: &ResourceAddress) {
        self.seen.borrow_mut().push(address.to_string());
    }
}

#[test]
fn test_observers_are_notified_on_reads_and_writes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut gateway = open_gateway();
    gateway.register_observer(Box::new(RecordingObserver { seen: seen.clone() }));

    let address = gateway.table_address("tasks");
    let created = gateway
        .insert(
            &address,
            &ContentValues::new()
                .with_text("title", "watched")
                .with_bool("done", false)
                .with_text("priority", "low"),
        )
        .unwrap();
    gateway.query(&created, None, None, &[], None).unwrap();
    gateway.delete(&created, None, &[]).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        [
            "row://app.test/tasks".to_string(),
            created.to_string(),
            created.to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// Migrations against database files
// ---------------------------------------------------------------------------

#[test]
fn test_migration_walk_from_script_directory() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    std::fs::create_dir_all(&scripts).unwrap();
    std::fs::write(
        scripts.join("create_schema.sql"),
        "CREATE TABLE tasks (_id INTEGER PRIMARY KEY, title TEXT NOT NULL);",
    )
    .unwrap();
    std::fs::write(
        scripts.join("upgrade_schema_2.sql"),
        "ALTER TABLE tasks ADD COLUMN done INTEGER NOT NULL DEFAULT 0;",
    )
    .unwrap();

    let db_path = dir.path().join("app.db");

    // First release: create at version 1.
    let migrator = Migrator::new(DirScriptSource::new(&scripts), 1);
    let conn = migrator.open_file(&db_path).unwrap();
    assert_eq!(migrator.status(&conn).unwrap().stored_version, 1);
    drop(conn);

    // Second release: upgrade to 3; version 3 itself has no script.
    let migrator = Migrator::new(DirScriptSource::new(&scripts), 3);
    let conn = migrator.open_file(&db_path).unwrap();
    let status = migrator.status(&conn).unwrap();
    assert!(status.is_current());
    assert!(status.foreign_keys);

    conn.execute("INSERT INTO tasks (title, done) VALUES ('ok', 1)", [])
        .unwrap();
}

#[test]
fn test_strict_migration_rejects_gaps() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("create_schema.sql"),
        "CREATE TABLE t (_id INTEGER PRIMARY KEY);",
    )
    .unwrap();

    let db_path = dir.path().join("app.db");
    Migrator::new(DirScriptSource::new(dir.path()), 1)
        .open_file(&db_path)
        .unwrap();

    let strict = Migrator::new(DirScriptSource::new(dir.path()), 2).with_options(
        MigrationOptions {
            on_missing_upgrade: MissingUpgrade::Fail,
        },
    );
    let err = strict.open_file(&db_path).unwrap_err();
    assert!(matches!(err, StoreError::ScriptNotFound(ref s) if s == "upgrade_schema_2"));
}

#[test]
fn test_read_only_connection_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("app.db");
    let source = MemoryScriptSource::new()
        .with("create_schema", "CREATE TABLE t (_id INTEGER PRIMARY KEY);");
    let migrator = Migrator::new(source, 1);
    drop(migrator.open_file(&db_path).unwrap());

    // A fresh connection starts with foreign keys off; enabling them on a
    // read-only connection is refused rather than silently skipped.
    let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
    let err = migrator.open(&conn).unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly));
}

#[test]
fn test_comment_heavy_script_end_to_end() {
    let source = MemoryScriptSource::new().with(
        "create_schema",
        "/* header\n   block */\nCREATE TABLE t ( -- inline comment\n  _id INTEGER PRIMARY KEY,\n  v TEXT\n);\n-- trailing comment\nINSERT INTO t (v) VALUES ('seeded');",
    );
    let conn = Connection::open_in_memory().unwrap();
    Migrator::new(source, 1).open(&conn).unwrap();

    let v: String = conn
        .query_row("SELECT v FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(v, "seeded");
}

#[test]
fn test_execute_script_skips_statement_without_terminator() {
    let conn = Connection::open_in_memory().unwrap();
    // The trailing fragment has no terminator and is silently dropped.
    execute_script(
        &conn,
        "CREATE TABLE t (_id INTEGER PRIMARY KEY);\nCREATE TABLE untermin",
    )
    .unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}
