//! Local key-value slots for board persistence.
//!
//! # Responsibility
//! - Provide the `get/set` text store the board store mirrors into.
//! - Keep SQLite details behind the `KeyValueStore` contract.
//!
//! # Invariants
//! - `set` is last-write-wins; there is no versioning.
//! - Values are opaque UTF-8 text (JSON in practice).

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Key-value store failure.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Text slot storage injected into the board store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&self, key: &str) -> KvResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        (**self).remove(key)
    }
}

/// Process-local store; contents vanish with the value.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection returned by `db::open_db*` (migrations applied).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

fn validate_key(key: &str) -> KvResult<()> {
    if key.trim().is_empty() {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{InMemoryKeyValueStore, KeyValueStore, KvError};

    #[test]
    fn in_memory_store_overwrites_and_removes() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("a").expect("get"), None);

        store.set("a", "1").expect("first set");
        store.set("a", "2").expect("overwrite");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("2"));

        store.remove("a").expect("remove");
        assert!(store.keys().is_empty());
    }

    #[test]
    fn blank_keys_are_rejected() {
        let store = InMemoryKeyValueStore::new();
        let err = store.set("  ", "x").expect_err("blank key must fail");
        assert!(matches!(err, KvError::InvalidKey(_)));
    }
}
