use habitlog_core::db::migrations::latest_version;
use habitlog_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_both_collections() {
    let conn = open_db_in_memory().expect("in-memory store should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "completions");
}

#[test]
fn reopening_existing_store_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("habits.db");

    let first = open_db(&path).expect("store should open");
    first
        .execute(
            "INSERT INTO completions (id, data) VALUES ('2026-01-01', '{}');",
            [],
        )
        .expect("raw insert should succeed");
    drop(first);

    let second = open_db(&path).expect("store should reopen");
    assert_eq!(schema_version(&second), latest_version());
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM completions;", [], |row| row.get(0))
        .expect("count query should succeed");
    assert_eq!(rows, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("raw connection should open");
    conn.execute_batch("PRAGMA user_version = 42;").expect("version bump should succeed");
    drop(conn);

    match open_db(&path).expect_err("newer schema should be rejected") {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn priority_column_rejects_unknown_values() {
    let conn = open_db_in_memory().expect("in-memory store should open");
    let result = conn.execute(
        "INSERT INTO tasks (id, name, color, priority, created_at)
         VALUES ('x', 'name', '#000000', 'urgent', 0);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version should be readable")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("sqlite_master query should succeed");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
