//! Keyed query cache
//!
//! The rendering layer keeps fetched listings under string keys and re-fetches
//! whenever a key is invalidated. Flows only ever see the [`QueryInvalidator`]
//! side of it.

use std::collections::HashMap;
use std::sync::Mutex;

/// Invalidation side of a keyed query cache.
pub trait QueryInvalidator: Send + Sync {
    /// Drop whatever is cached under `key`; the next read re-fetches.
    fn invalidate(&self, key: &str);
}

/// In-memory keyed cache of query results.
#[derive(Debug, Default)]
pub struct QueryCache<T> {
    entries: Mutex<HashMap<String, T>>,
}

impl<T: Clone> QueryCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.lock().expect("cache mutex").get(key).cloned()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, value: T) {
        self.entries
            .lock()
            .expect("cache mutex")
            .insert(key.to_string(), value);
    }
}

impl<T: Send> QueryInvalidator for QueryCache<T> {
    fn invalidate(&self, key: &str) {
        self.entries.lock().expect("cache mutex").remove(key);
    }
}
