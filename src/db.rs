use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Small string key-value store behind a trait so the persistence helper
// and the tests do not care where values actually live.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open_default() -> Result<Self> {
        let app_data_dir = Self::get_app_data_dir()?;
        if !app_data_dir.exists() {
            std::fs::create_dir_all(&app_data_dir)?;
        }
        Self::open(app_data_dir.join("settings.db"))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get_app_data_dir() -> Result<PathBuf> {
        let home_dir =
            dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".hacker_stories"))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }
}

// In-memory fallback. Used by tests, and by the app when the settings
// database cannot be opened; the search term simply stops persisting.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Failed to lock memory store"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Failed to lock memory store"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Pairs a string value with a store key: reads the stored value once at
// construction and writes through on later changes. Construction never
// writes, so an untouched default is not persisted.
pub struct PersistedValue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: String,
    written: String,
}

impl PersistedValue {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &str, default: &str) -> Self {
        let value = match store.get(key) {
            Ok(Some(stored)) => stored,
            Ok(None) => default.to_string(),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not read persisted value");
                default.to_string()
            }
        };

        Self {
            store,
            key: key.to_string(),
            written: value.clone(),
            value,
        }
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    // Mutable access for the text edit widget; call `flush` after edits.
    pub fn value_mut(&mut self) -> &mut String {
        &mut self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.flush();
    }

    pub fn flush(&mut self) {
        if self.value == self.written {
            return;
        }
        match self.store.set(&self.key, &self.value) {
            Ok(()) => self.written = self.value.clone(),
            Err(e) => tracing::warn!(key = %self.key, error = %e, "could not persist value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::default(),
                writes: AtomicUsize::new(0),
            }
        }
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::default();
        assert_eq!(store.get("search").unwrap(), None);

        store.set("search", "rust").unwrap();
        assert_eq!(store.get("search").unwrap(), Some("rust".to_string()));
    }

    #[test]
    fn sqlite_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("settings.db")).unwrap();

        assert_eq!(store.get("search").unwrap(), None);
        store.set("search", "rust").unwrap();
        store.set("search", "wasm").unwrap();
        assert_eq!(store.get("search").unwrap(), Some("wasm".to_string()));
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("search", "rust").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("search").unwrap(), Some("rust".to_string()));
    }

    #[test]
    fn persisted_value_reads_the_stored_value() {
        let store = Arc::new(MemoryStore::default());
        store.set("search", "stored").unwrap();

        let value = PersistedValue::new(store, "search", "default");
        assert_eq!(value.get(), "stored");
    }

    #[test]
    fn persisted_value_falls_back_to_the_default() {
        let store = Arc::new(MemoryStore::default());
        let value = PersistedValue::new(store, "search", "default");
        assert_eq!(value.get(), "default");
    }

    #[test]
    fn construction_does_not_write() {
        let store = Arc::new(CountingStore::new());
        let _value = PersistedValue::new(store.clone(), "search", "default");

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.get("search").unwrap(), None);
    }

    #[test]
    fn set_writes_through_once_per_change() {
        let store = Arc::new(CountingStore::new());
        let mut value = PersistedValue::new(store.clone(), "search", "default");

        value.set("rust");
        assert_eq!(store.get("search").unwrap(), Some("rust".to_string()));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        // Setting the same value again is a no-op
        value.set("rust");
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn flush_after_direct_edits_persists_the_buffer() {
        let store = Arc::new(CountingStore::new());
        let mut value = PersistedValue::new(store.clone(), "search", "default");

        value.value_mut().push_str(" lang");
        value.flush();
        assert_eq!(
            store.get("search").unwrap(),
            Some("default lang".to_string())
        );
    }
}
