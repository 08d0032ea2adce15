//! Content-addressed caching of build results.
//!
//! A build is identified by a deterministic digest of everything that can
//! affect its output ([`cache_key`]). Completed builds are stored as flat
//! [`CacheRecord`]s through a pluggable [`CacheBackend`]; [`BuildCache`] is
//! the instance a compiler is handed, with an optional positional mode that
//! replays records in insertion order.

#![warn(missing_docs)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod key;
pub mod record;
pub mod store;

pub use backend::{CacheBackend, MemoryBackend};
pub use cache::{BuildCache, CacheMode};
pub use error::CacheError;
pub use key::{cache_key, KeyInputs, ValidatorKey};
pub use record::{ArgumentRecord, CacheRecord, UserFuncRecord, ValidatorRecord};
pub use store::DirBackend;
