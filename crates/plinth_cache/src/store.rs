//! File-system cache backend.
//!
//! Each entry is one file, `<dir>/<key>.plc`, holding a binary header
//! (magic bytes, format version, payload checksum) followed by the payload.
//! Every call opens and closes its file; nothing is held between calls.

use std::path::{Path, PathBuf};

use plinth_common::ContentHash;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::CacheBackend;
use crate::error::CacheError;

/// Magic bytes identifying a Plinth cache entry.
const ENTRY_MAGIC: [u8; 4] = *b"PLNC";

/// Current entry format version. Increment on breaking changes to
/// the header or payload format.
const ENTRY_FORMAT_VERSION: u32 = 1;

/// File extension of cache entries.
const ENTRY_EXT: &str = "plc";

/// Header prepended to every cache entry for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Magic bytes: must be `b"PLNC"`.
    pub magic: [u8; 4],

    /// Entry format version.
    pub format_version: u32,

    /// Content hash of the payload (for integrity checks).
    pub checksum: ContentHash,
}

/// A [`CacheBackend`] storing one file per entry in a directory.
#[derive(Debug, Clone)]
pub struct DirBackend {
    dir: PathBuf,
}

impl DirBackend {
    /// Creates a backend rooted at `dir`. The directory is created on the
    /// first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Returns the file path of the entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXT}"))
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })
    }

    /// Writes an entry with a fresh header.
    pub fn write_entry(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let path = self.entry_path(key);

        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(data),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads and validates an entry.
    ///
    /// Returns `Ok(None)` when no entry exists and an error when the file
    /// is unreadable, truncated, foreign, from another format version, or
    /// fails its checksum.
    pub fn read_entry(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };

        let invalid = |reason: &str| CacheError::InvalidHeader {
            path: path.clone(),
            reason: reason.to_string(),
        };

        let len_bytes: [u8; 4] = raw
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| invalid("missing header length"))?;
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        let header_bytes = raw
            .get(4..4 + header_len)
            .ok_or_else(|| invalid("truncated header"))?;

        let (header, _): (EntryHeader, usize) =
            bincode::serde::decode_from_slice(header_bytes, bincode::config::standard())
                .map_err(|e| invalid(&e.to_string()))?;

        if header.magic != ENTRY_MAGIC {
            return Err(invalid("missing magic bytes"));
        }
        if header.format_version != ENTRY_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                expected: ENTRY_FORMAT_VERSION,
                actual: header.format_version,
            });
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                path,
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(Some(payload.to_vec()))
    }
}

impl CacheBackend for DirBackend {
    fn has(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.read_entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.write_entry(key, bytes)
    }
}
