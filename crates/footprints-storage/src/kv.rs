//! The key-value seam the transcript and session stores are written against.

use std::collections::HashMap;
use std::sync::Mutex;

use footprints_core::error::FootprintsError;

use crate::db::Database;

/// On-device string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, FootprintsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), FootprintsError>;
    fn remove(&self, key: &str) -> Result<(), FootprintsError>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, FootprintsError> {
        Database::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FootprintsError> {
        Database::set(self, key, value)
    }

    fn remove(&self, key: &str) -> Result<(), FootprintsError> {
        Database::remove(self, key)
    }
}

/// Process-local store. Used in tests and when no data directory is usable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, FootprintsError> {
        self.entries
            .lock()
            .map_err(|e| FootprintsError::Storage(format!("memory store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, FootprintsError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FootprintsError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FootprintsError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_memory_store_behaves_like_a_map() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_database_through_trait_object() {
        exercise(&Database::in_memory().unwrap());
    }
}
