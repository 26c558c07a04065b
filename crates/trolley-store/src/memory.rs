//! In-memory session store.

use crate::{SessionStore, StoreError};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local session store backed by a `HashMap`.
///
/// Values are kept as JSON. The map sits behind a `Mutex` so the store
/// can be shared behind an `Arc` and still expose `&self` methods.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, serde_json::Value>) -> R,
    ) -> Result<R, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(f(&mut entries))
    }
}

impl SessionStore for MemoryStore {
    fn has(&self, key: &str) -> Result<bool, StoreError> {
        self.with_entries(|entries| entries.contains_key(key))
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let stored = self.with_entries(|entries| entries.get(key).cloned())?;
        match stored {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        store.put("greeting", &"hello".to_string()).unwrap();

        let value: Option<String> = store.get("greeting").unwrap();
        assert_eq!(value, Some("hello".to_string()));
    }

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        let value: Option<String> = store.get("missing").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_has() {
        let store = MemoryStore::new();
        assert!(!store.has("counter").unwrap());

        store.put("counter", &7_i64).unwrap();
        assert!(store.has("counter").unwrap());
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("counter", &1_i64).unwrap();
        store.put("counter", &2_i64).unwrap();

        let value: Option<i64> = store.get("counter").unwrap();
        assert_eq!(value, Some(2));
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        store.put("counter", &7_i64).unwrap();
        store.delete("counter").unwrap();

        assert!(!store.has("counter").unwrap());
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.delete("missing").unwrap();
    }

    #[test]
    fn test_shared_behind_arc() {
        let store = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);

        other.put("counter", &7_i64).unwrap();
        let value: Option<i64> = store.get("counter").unwrap();
        assert_eq!(value, Some(7));
    }

    #[test]
    fn test_structured_values_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Line {
            sku: String,
            quantity: i64,
        }

        let store = MemoryStore::new();
        let line = Line {
            sku: "sku-1".to_string(),
            quantity: 3,
        };
        store.put("line", &line).unwrap();

        let loaded: Option<Line> = store.get("line").unwrap();
        assert_eq!(loaded, Some(line));
    }
}
