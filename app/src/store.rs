//! Named-collection record store.
//!
//! Every collection is one JSON document under a well-known key. Updates are
//! read-modify-write of the whole collection: callers load everything, build
//! the new sequence in memory and hand it back in one `save_all`. The previous
//! snapshot stays in place until that single write lands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{sqlite_error_string, Error, Result};

pub const DRIVERS: &str = "drivers";
pub const INVOICES: &str = "invoices";
pub const SAVED_BROKERS: &str = "savedBrokers";
pub const USERS: &str = "users";
pub const CURRENT_USER: &str = "currentUser";
pub const SETTINGS: &str = "settings";

pub const DB_FILE_NAME: &str = "haulit.db";

/// Raw key-value persistence. Implementations only move JSON text around.
pub trait CollectionStore: Send + Sync {
    fn load_raw(&self, collection: &str) -> Result<Option<String>>;
    fn save_raw(&self, collection: &str, json: &str) -> Result<()>;
    fn remove(&self, collection: &str) -> Result<()>;
}

/// Typed access on top of any `CollectionStore`.
pub trait CollectionStoreExt: CollectionStore {
    /// Missing key reads as an empty collection.
    fn load_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        match self.load_raw(collection)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_all<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.save_raw(collection, &json)
    }

    fn load_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load_raw(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_value<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.save_raw(key, &json)
    }

    fn contains(&self, collection: &str) -> Result<bool> {
        Ok(self.load_raw(collection)?.is_some())
    }
}

impl<S: CollectionStore + ?Sized> CollectionStoreExt for S {}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        configure_sqlite(&conn)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T, F>(&self, op_name: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, rusqlite::Error>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| Error::Store("db mutex poisoned".to_string()))?;
        f(&guard).map_err(|e| {
            error!("[sqlite] {{ op: {:?}, error: {:?} }}", op_name, sqlite_error_string(&e));
            Error::Database(e)
        })
    }
}

impl CollectionStore for SqliteStore {
    fn load_raw(&self, collection: &str) -> Result<Option<String>> {
        self.with_conn("load_raw", |conn| {
            conn.query_row(
                "SELECT value FROM collections WHERE name = ?1",
                params![collection],
                |r| r.get(0),
            )
            .optional()
        })
    }

    fn save_raw(&self, collection: &str, json: &str) -> Result<()> {
        debug!("saving collection {collection} ({} bytes)", json.len());
        self.with_conn("save_raw", |conn| {
            conn.execute(
                r#"INSERT INTO collections (name, value, updatedAt) VALUES (?1, ?2, ?3)
                   ON CONFLICT(name) DO UPDATE SET value = excluded.value, updatedAt = excluded.updatedAt"#,
                params![collection, json, crate::now_iso()],
            )?;
            Ok(())
        })
    }

    fn remove(&self, collection: &str) -> Result<()> {
        self.with_conn("remove", |conn| {
            conn.execute("DELETE FROM collections WHERE name = ?1", params![collection])?;
            Ok(())
        })
    }
}

fn configure_sqlite(conn: &Connection) -> std::result::Result<(), rusqlite::Error> {
    // Applied once on open, outside any transaction.
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;\n\
         PRAGMA synchronous = NORMAL;\n\
         PRAGMA temp_store = MEMORY;\n\
         PRAGMA busy_timeout = 5000;\n",
    )?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn init_schema(conn: &Connection) -> std::result::Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updatedAt TEXT NOT NULL
        );
        "#,
    )
}

/// In-process store, handy for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Store("memory store mutex poisoned".to_string()))
    }
}

impl CollectionStore for MemoryStore {
    fn load_raw(&self, collection: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(collection).cloned())
    }

    fn save_raw(&self, collection: &str, json: &str) -> Result<()> {
        self.entries()?.insert(collection.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        self.entries()?.remove(collection);
        Ok(())
    }
}

/// Where an existing `haulit.db` is looked for: next to the executable, then
/// in the working directory.
fn db_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(DB_FILE_NAME));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(DB_FILE_NAME));
    }
    candidates
}

/// Picks the database file: an explicit path wins, then an existing
/// `haulit.db` next to the executable or in the working directory, then a
/// fresh one in the working directory.
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Some(found) = db_candidates().into_iter().find(|p| p.exists()) {
        return found;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(DB_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        amount: f64,
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row {
                id: format!("r{i}"),
                amount: 0.1 * i as f64 + 1.0 / 3.0,
            })
            .collect()
    }

    #[test]
    fn missing_collection_reads_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let loaded: Vec<Row> = store.load_all("nothing-here").unwrap();
        assert!(loaded.is_empty());
        assert!(!store.contains("nothing-here").unwrap());
    }

    #[test]
    fn sqlite_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("haulit.db");
        let original = rows(25);
        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_all("rows", &original).unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        let loaded: Vec<Row> = reopened.load_all("rows").unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn save_all_replaces_whole_collection() {
        let store = MemoryStore::new();
        store.save_all("rows", &rows(5)).unwrap();
        store.save_all("rows", &rows(2)).unwrap();
        let loaded: Vec<Row> = store.load_all("rows").unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn remove_drops_the_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save_value("one", &Row { id: "x".into(), amount: 2.0 }).unwrap();
        assert!(store.load_value::<Row>("one").unwrap().is_some());
        store.remove("one").unwrap();
        assert!(store.load_value::<Row>("one").unwrap().is_none());
    }

    #[test]
    fn corrupt_collection_is_an_error_not_empty() {
        let store = MemoryStore::new();
        store.save_raw("rows", "{not json").unwrap();
        let res: Result<Vec<Row>> = store.load_all("rows");
        assert!(matches!(res, Err(Error::Json(_))));
    }

    #[test]
    fn explicit_db_path_wins() {
        let p = Path::new("/tmp/elsewhere/custom.db");
        assert_eq!(resolve_db_path(Some(p)), p.to_path_buf());
    }

    #[test]
    fn executable_dir_is_searched_before_working_dir() {
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            db_candidates(),
            vec![exe_dir.join(DB_FILE_NAME), cwd.join(DB_FILE_NAME)]
        );
        if !cwd.join(DB_FILE_NAME).exists() && !exe_dir.join(DB_FILE_NAME).exists() {
            assert_eq!(resolve_db_path(None), cwd.join(DB_FILE_NAME));
        }
    }
}
