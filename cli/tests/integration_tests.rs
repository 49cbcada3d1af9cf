//! Integration tests for the rowkit CLI, driving the built binary.

use std::fs;
use std::path::Path;
use std::process::Command;

fn rowkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rowkit"))
}

fn write_scripts(dir: &Path) {
    fs::write(
        dir.join("create_schema.sql"),
        "CREATE TABLE tasks (_id INTEGER PRIMARY KEY, title TEXT NOT NULL);",
    )
    .unwrap();
    fs::write(
        dir.join("upgrade_schema_2.sql"),
        "ALTER TABLE tasks ADD COLUMN done INTEGER NOT NULL DEFAULT 0;",
    )
    .unwrap();
}

#[test]
fn test_migrate_then_status() {
    let dir = tempfile::tempdir().unwrap();
    write_scripts(dir.path());
    let db = dir.path().join("app.db");

    let output = rowkit()
        .args(["migrate", "--db"])
        .arg(&db)
        .arg("--scripts")
        .arg(dir.path())
        .args(["--target", "2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("schema version 2"), "{stdout}");

    let output = rowkit()
        .args(["status", "--db"])
        .arg(&db)
        .args(["--target", "2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stored version: 2"), "{stdout}");
    assert!(stdout.contains("up to date:     yes"), "{stdout}");
}

#[test]
fn test_strict_migrate_fails_on_gap() {
    let dir = tempfile::tempdir().unwrap();
    write_scripts(dir.path());
    let db = dir.path().join("app.db");

    // Target 3 has no upgrade script; strict mode must refuse.
    let output = rowkit()
        .args(["migrate", "--db"])
        .arg(&db)
        .arg("--scripts")
        .arg(dir.path())
        .args(["--target", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = rowkit()
        .args(["migrate", "--db"])
        .arg(&db)
        .arg("--scripts")
        .arg(dir.path())
        .args(["--target", "3", "--strict"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("upgrade_schema_3"), "{stderr}");
}

#[test]
fn test_split_prints_statements() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("schema.sql");
    fs::write(&script, "A;\n-- comment\nB;\n/* x\ny */C;").unwrap();

    let output = rowkit()
        .args(["split", "--input"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-- 3 statement(s)"), "{stdout}");
}

#[test]
fn test_exec_runs_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("seed.sql");
    fs::write(
        &script,
        "CREATE TABLE t (_id INTEGER PRIMARY KEY, v TEXT);\nINSERT INTO t (v) VALUES ('x');",
    )
    .unwrap();
    let db = dir.path().join("app.db");

    let output = rowkit()
        .args(["exec", "--db"])
        .arg(&db)
        .arg("--script")
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let conn = rusqlite::Connection::open(&db).unwrap();
    let v: String = conn.query_row("SELECT v FROM t", [], |r| r.get(0)).unwrap();
    assert_eq!(v, "x");
}
