//! Cache failures.

use std::path::PathBuf;

/// A cache entry could not be read, written, or decoded.
///
/// [`BuildCache`](crate::BuildCache) lookups never surface these: a bad
/// entry is logged and treated as a miss. Stores return them to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing an entry file failed.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// Entry file or cache directory.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A stored build record is not valid record JSON.
    #[error("failed to parse cache record: {reason}")]
    RecordParse {
        /// Parser message.
        reason: String,
    },

    /// An entry file is truncated or lacks the `PLNC` header.
    #[error("invalid cache entry header in {path}: {reason}")]
    InvalidHeader {
        /// Entry file.
        path: PathBuf,
        /// What is wrong with the header.
        reason: String,
    },

    /// An entry payload does not hash to the checksum in its header.
    #[error("checksum mismatch in {path}: header says {expected}, payload hashes to {actual}")]
    ChecksumMismatch {
        /// Entry file.
        path: PathBuf,
        /// Checksum recorded in the header.
        expected: String,
        /// Checksum of the payload as read.
        actual: String,
    },

    /// An entry was written by another entry format version.
    #[error("entry format mismatch in {path}: expected version {expected}, got {actual}")]
    VersionMismatch {
        /// Entry file.
        path: PathBuf,
        /// Version this build writes.
        expected: u32,
        /// Version recorded in the entry.
        actual: u32,
    },

    /// A header, record, or parameter could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Serializer message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/ab12.plc"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("ab12.plc"));
    }

    #[test]
    fn record_parse_display() {
        let err = CacheError::RecordParse {
            reason: "unexpected EOF".to_string(),
        };
        assert!(err.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = CacheError::ChecksumMismatch {
            path: PathBuf::from("entry.plc"),
            expected: "aabb".to_string(),
            actual: "ccdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("header says aabb"));
        assert!(msg.contains("aabb"));
        assert!(msg.contains("ccdd"));
    }

    #[test]
    fn version_mismatch_display() {
        let err = CacheError::VersionMismatch {
            path: PathBuf::from("old.plc"),
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected version 2"));
        assert!(msg.contains("got 1"));
    }
}
