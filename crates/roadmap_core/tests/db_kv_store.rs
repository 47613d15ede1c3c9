use roadmap_core::db::migrations::latest_version;
use roadmap_core::{
    open_db, open_db_in_memory, DbError, KeyValueStore, KvError, SqliteKeyValueStore,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roadmap.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_entries");
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
fn sqlite_slots_overwrite_and_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roadmap.db");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKeyValueStore::new(&conn);
        store.set("roadmap-data", "{\"products\":[]}").unwrap();
        store.set("roadmap-data", "{\"products\":[{\"name\":\"Web\"}]}").unwrap();
        store.set("roadmap-product-web", "{\"name\":\"Web\"}").unwrap();
        store.remove("roadmap-product-web").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKeyValueStore::new(&conn);
    assert_eq!(
        store.get("roadmap-data").unwrap().as_deref(),
        Some("{\"products\":[{\"name\":\"Web\"}]}")
    );
    assert_eq!(store.get("roadmap-product-web").unwrap(), None);
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_store_rejects_blank_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::new(&conn);

    let err = store.set(" ", "value").unwrap_err();
    assert!(matches!(err, KvError::InvalidKey(_)));
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
