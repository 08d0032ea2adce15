//! Storage backends for serialized cache records.

use std::collections::HashMap;

use crate::error::CacheError;

/// Byte storage keyed by the hex form of a cache key.
///
/// Reads never fail: a missing or unreadable entry is a miss.
pub trait CacheBackend {
    /// Returns whether an entry exists for `key`.
    fn has(&self, key: &str) -> bool;

    /// Returns the stored bytes for `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `bytes` under `key`, replacing any previous entry.
    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
}

/// A backend that keeps entries in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the backend is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheBackend for MemoryBackend {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
