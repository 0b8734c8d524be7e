//! Key-value storage for persisted and session-scoped state

use std::cell::RefCell;
use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::error::Result;

/// Keys under which application state is stored
pub mod keys {
    /// Ordered quote snapshot
    pub const QUOTES: &str = "quotes";
    /// Active category filter
    pub const FILTER: &str = "quoteFilter";
    /// Unix ms of the last committed sync
    pub const LAST_SYNC: &str = "lastSync";
    /// Auto-sync preference
    pub const AUTO_SYNC_ENABLED: &str = "autoSyncEnabled";
    /// Last displayed quote (session store only)
    pub const LAST_QUOTE: &str = "lastQuote";
}

/// Trait for string key-value storage operations
pub trait KeyValueStore {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Store several entries so that either all or none become visible
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;

    /// Remove `key` if present
    fn remove(&self, key: &str) -> Result<()>;

    /// Read and decode a JSON value. Decoding errors are returned as-is.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.get(key)?
            .map(|raw| serde_json::from_str(&raw).map_err(Into::into))
            .transpose()
    }

    /// Encode `value` as JSON and store it
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.set(key, &serde_json::to_string(value)?)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .connection()
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.connection().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.connection().unchecked_transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.connection()
            .execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory store for session-scoped state and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.borrow_mut();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Memory store whose writes can be switched to fail, for error-path tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    /// Fail single-key writes (`set`)
    pub fail_set: std::cell::Cell<bool>,
    /// Fail batched writes (`set_many`)
    pub fail_set_many: std::cell::Cell<bool>,
}

#[cfg(test)]
impl FlakyStore {
    fn injected() -> crate::error::Error {
        std::io::Error::other("injected write failure").into()
    }
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_set.get() {
            return Err(Self::injected());
        }
        self.inner.set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        if self.fail_set_many.get() {
            return Err(Self::injected());
        }
        self.inner.set_many(entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &impl KeyValueStore) {
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));

        store
            .set_many(&[("b", "x".to_string()), ("c", "y".to_string())])
            .unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("x"));
        assert_eq!(store.get("c").unwrap().as_deref(), Some("y"));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store_operations() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store_operations() {
        exercise(&Database::open_in_memory().unwrap());
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("kv.db");
        {
            let db = Database::open(&path).unwrap();
            db.set_json(keys::LAST_SYNC, &1234_i64).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_json::<i64>(keys::LAST_SYNC).unwrap(), Some(1234));
    }

    #[test]
    fn test_get_json_reports_decode_errors() {
        let store = MemoryStore::new();
        store.set(keys::AUTO_SYNC_ENABLED, "not-json").unwrap();
        assert!(store.get_json::<bool>(keys::AUTO_SYNC_ENABLED).is_err());
    }
}
