//! Shared foundational types used across the Plinth toolchain.
//!
//! This crate provides content hashing, the canonical on-chain data tree, and
//! the interface to compiled bytecode programs consumed by the codec, cache,
//! and compiler crates.

#![warn(missing_docs)]

pub mod data;
pub mod hash;
pub mod program;

pub use data::{Data, DataKind};
pub use hash::{ContentHash, ContentHasher, ParseHashError};
pub use program::{EvalError, LoadError, Program, ProgramLoader, ProgramPair};
