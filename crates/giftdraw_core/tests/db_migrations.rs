use giftdraw_core::db::migrations::{apply_migrations, latest_version};
use giftdraw_core::db::{inspect_schema, open_db, open_db_in_memory, DbError, SchemaState};
use giftdraw_core::{RepoError, SqliteParticipantRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "participants");
    assert_table_exists(&conn, "wishlist_items");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("giftdraw.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "participants");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteParticipantRepository::try_new(&conn)
        .err()
        .expect("raw connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn schema_rejects_self_assignment_and_orphan_purchase_state() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO participants (uuid, name) VALUES ('a', 'Ana');",
        [],
    )
    .unwrap();

    let self_assign = conn.execute(
        "UPDATE participants SET recipient_uuid = 'a' WHERE uuid = 'a';",
        [],
    );
    assert!(self_assign.is_err());

    let orphan_purchase = conn.execute(
        "INSERT INTO wishlist_items (uuid, participant_uuid, position, text, purchased)
         VALUES ('i', 'a', 0, 'socks', 1);",
        [],
    );
    assert!(orphan_purchase.is_err());
}

#[test]
fn inspect_schema_reports_behind_current_and_ahead() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert_eq!(
        inspect_schema(&conn).unwrap(),
        SchemaState::Behind { db_version: 0 }
    );

    assert_eq!(apply_migrations(&mut conn).unwrap(), latest_version() as usize);
    assert_eq!(inspect_schema(&conn).unwrap(), SchemaState::Current);
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);

    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    assert_eq!(
        inspect_schema(&conn).unwrap(),
        SchemaState::Ahead { db_version: 42 }
    );
}

#[test]
fn partially_migrated_database_is_brought_up_to_date() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE participants (
            uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            recipient_uuid TEXT NULL,
            created_at INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL DEFAULT 0
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();

    assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "wishlist_items");
}

#[test]
fn failing_schema_step_is_named_and_rolled_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    // A view cannot be indexed, so the wishlist step fails after the
    // participants step has already run in the same transaction.
    conn.execute_batch("CREATE VIEW wishlist_items AS SELECT 1 AS participant_uuid, 0 AS position;")
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    match err {
        DbError::MigrationFailed { version, name, .. } => {
            assert_eq!(version, 2);
            assert_eq!(name, "wishlist_items");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(schema_version(&conn), 0);
    let participants_tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'participants';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(participants_tables, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
