//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex and exposes the
//! get/set/remove operations of a string key-value store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use footprints_core::error::FootprintsError;

use crate::migrations;

/// SQLite-backed key-value database.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, FootprintsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| FootprintsError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| FootprintsError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());
        Self::with_migrations(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, FootprintsError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FootprintsError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::with_migrations(conn)
    }

    fn with_migrations(conn: Connection) -> Result<Self, FootprintsError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, FootprintsError>
    where
        F: FnOnce(&Connection) -> Result<T, FootprintsError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FootprintsError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Read the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, FootprintsError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| FootprintsError::Storage(format!("Failed to read {}: {}", key, e)))
        })
    }

    /// Insert or overwrite the value stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> Result<(), FootprintsError> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| FootprintsError::Storage(format!("Failed to write {}: {}", key, e)))?;
            Ok(())
        })
    }

    /// Delete `key`. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), FootprintsError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
                .map_err(|e| FootprintsError::Storage(format!("Failed to remove {}: {}", key, e)))?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_set_get_remove() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get("session-id").unwrap(), None);

        db.set("session-id", "abc").unwrap();
        assert_eq!(db.get("session-id").unwrap().as_deref(), Some("abc"));

        db.set("session-id", "def").unwrap();
        assert_eq!(db.get("session-id").unwrap().as_deref(), Some("def"));

        db.remove("session-id").unwrap();
        assert_eq!(db.get("session-id").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let db = Database::in_memory().unwrap();
        assert!(db.remove("never-written").is_ok());
    }

    #[test]
    fn test_file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("footprints.db");

        {
            let db = Database::open(&path).unwrap();
            db.set("chat-history", "[]").unwrap();
        }

        assert!(path.exists());
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("chat-history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_updated_at_is_recorded() {
        let db = Database::in_memory().unwrap();
        db.set("k", "v").unwrap();
        let updated_at: i64 = db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT updated_at FROM kv_entries WHERE key = 'k'",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| FootprintsError::Storage(e.to_string()))
            })
            .unwrap();
        assert!(updated_at > 0);
    }
}
