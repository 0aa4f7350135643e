use milestone_core::db::migrations::{apply_migrations, stored_version, supported_version};
use milestone_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_in_memory_applies_supported_version() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(stored_version(&conn).unwrap(), supported_version());
}

#[test]
fn open_file_db_creates_kv_table() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("kv.sqlite3")).unwrap();

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(stored_version(&conn).unwrap(), supported_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let future = supported_version() + 1;
    conn.execute_batch(&format!("PRAGMA user_version = {future};"))
        .unwrap();

    match apply_migrations(&mut conn) {
        Err(DbError::NewerMedium { found, supported }) => {
            assert_eq!(found, future);
            assert_eq!(supported, supported_version());
        }
        other => panic!("expected newer medium error, got {other:?}"),
    }
}

#[test]
fn kv_table_with_another_layout_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE kv_entries (key TEXT PRIMARY KEY, payload BLOB);")
        .unwrap();

    match apply_migrations(&mut conn) {
        Err(DbError::ForeignTable { missing_column }) => assert_eq!(missing_column, "value"),
        other => panic!("expected foreign table error, got {other:?}"),
    }
}

#[test]
fn failed_step_reports_version_and_leaves_layout_untouched() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    match apply_migrations(&mut conn) {
        Err(DbError::StepFailed { version, step, .. }) => {
            assert_eq!(version, 1);
            assert_eq!(step, "create_kv_entries");
        }
        other => panic!("expected failed step, got {other:?}"),
    }
    assert_eq!(stored_version(&conn).unwrap(), 0);
}

#[test]
fn opened_connection_bounds_lock_waits() {
    let conn = open_db_in_memory().unwrap();
    let timeout_ms: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout_ms, 5_000);
}
