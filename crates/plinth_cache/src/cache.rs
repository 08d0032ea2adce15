//! The cache instance handed to the compiler.

use plinth_common::ContentHash;
use tracing::{info, warn};

use crate::backend::{CacheBackend, MemoryBackend};
use crate::error::CacheError;
use crate::record::CacheRecord;

/// How [`BuildCache`] locates records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Records are found by cache key through the backend.
    #[default]
    Keyed,
    /// Records are served in insertion order, ignoring keys.
    Positional,
}

/// Build-result cache.
///
/// In keyed mode records are serialized as JSON and stored in the backend
/// under the hex form of their key. In positional mode records are appended
/// to an in-memory list and consumed through a read cursor that
/// [`rewind`](Self::rewind) resets; the backend is not consulted. The two
/// modes never see each other's entries.
pub struct BuildCache {
    mode: CacheMode,
    backend: Box<dyn CacheBackend>,
    entries: Vec<CacheRecord>,
    cursor: usize,
}

impl BuildCache {
    /// A keyed cache over `backend`.
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            mode: CacheMode::Keyed,
            backend,
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// A keyed cache that lives in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// A positional cache.
    pub fn positional() -> Self {
        Self {
            mode: CacheMode::Positional,
            ..Self::in_memory()
        }
    }

    /// Returns the lookup mode.
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Returns whether a lookup for `key` would currently hit.
    pub fn contains(&self, key: &ContentHash) -> bool {
        match self.mode {
            CacheMode::Keyed => self.backend.has(&key.to_string()),
            CacheMode::Positional => self.cursor < self.entries.len(),
        }
    }

    /// Looks up a record.
    ///
    /// In positional mode the key is ignored and a hit advances the cursor.
    /// Undecodable records are reported and treated as misses.
    pub fn lookup(&mut self, key: &ContentHash) -> Option<CacheRecord> {
        let found = match self.mode {
            CacheMode::Keyed => {
                let bytes = self.backend.get(&key.to_string())?;
                match CacheRecord::from_json(&bytes) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(%key, error = %e, "ignoring undecodable cache record");
                        None
                    }
                }
            }
            CacheMode::Positional => {
                let record = self.entries.get(self.cursor).cloned();
                if record.is_some() {
                    self.cursor += 1;
                }
                record
            }
        };
        match &found {
            Some(_) => info!(%key, mode = ?self.mode, "build cache hit"),
            None => info!(%key, mode = ?self.mode, "build cache miss"),
        }
        found
    }

    /// Stores the record of a completed build.
    ///
    /// In positional mode the record is appended and the cursor moves past
    /// it, so it is served again only after a rewind.
    pub fn store(&mut self, key: &ContentHash, record: &CacheRecord) -> Result<(), CacheError> {
        match self.mode {
            CacheMode::Keyed => {
                let bytes = record.to_json()?;
                self.backend.set(&key.to_string(), &bytes)?;
            }
            CacheMode::Positional => {
                self.entries.push(record.clone());
                self.cursor = self.entries.len();
            }
        }
        info!(%key, validators = record.validators.len(), "stored build in cache");
        Ok(())
    }

    /// Restarts positional consumption from the first entry.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Returns the number of positional entries.
    pub fn positional_len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for BuildCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for BuildCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildCache")
            .field("mode", &self.mode)
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
