//! In-memory key-value store
//!
//! Used by tests and by callers that want a throwaway session.

use super::KeyValueStore;
use crate::error::{FitbotError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Key-value store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| FitbotError::Storage("Memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| FitbotError::Storage("Memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| FitbotError::Storage("Memory store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("theme", b"\"light\"").unwrap();
        assert_eq!(store.get("theme").unwrap(), Some(b"\"light\"".to_vec()));
        assert_eq!(store.len(), 1);

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }
}
