//! Interface to compiled bytecode programs.
//!
//! Programs are produced by an external front-end and evaluated by an
//! external engine. The toolchain only needs their digest, an evaluation
//! entry point, and a byte serialization for caching.

use std::fmt;
use std::sync::Arc;

use crate::data::Data;

/// A failed program evaluation, carrying the engine's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    /// Engine-provided error text.
    pub message: String,
}

impl EvalError {
    /// Creates an evaluation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A program could not be reconstructed from its serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load program: {reason}")]
pub struct LoadError {
    /// Description of the failure.
    pub reason: String,
}

/// An opaque compiled program.
pub trait Program: fmt::Debug + Send + Sync {
    /// Returns the on-chain digest of this program.
    fn hash(&self) -> Vec<u8>;

    /// Applies the program to positional arguments and evaluates it.
    fn eval(&self, args: &[Data]) -> Result<Data, EvalError>;

    /// Serializes the program. [`ProgramLoader::load_program`] is the inverse.
    fn to_bytes(&self) -> Vec<u8>;
}

/// Reconstructs programs from the bytes produced by [`Program::to_bytes`].
pub trait ProgramLoader {
    /// Loads a program. `version` is the execution-format tag recorded
    /// alongside the bytes.
    fn load_program(&self, bytes: &[u8], version: &str) -> Result<Arc<dyn Program>, LoadError>;
}

/// An optimized program paired with its optional unoptimized variant.
///
/// Both variants implement the same behaviour. The unoptimized one keeps
/// diagnostic traces and is used to cross-check the optimizer.
#[derive(Debug, Clone)]
pub struct ProgramPair {
    /// The program that goes on-chain. Its hash is the identity.
    pub optimized: Arc<dyn Program>,
    /// Trace-preserving variant, if one was built.
    pub unoptimized: Option<Arc<dyn Program>>,
}

impl ProgramPair {
    /// Wraps a single optimized program.
    pub fn new(optimized: Arc<dyn Program>) -> Self {
        Self {
            optimized,
            unoptimized: None,
        }
    }

    /// Attaches the unoptimized variant.
    pub fn with_unoptimized(mut self, unoptimized: Arc<dyn Program>) -> Self {
        self.unoptimized = Some(unoptimized);
        self
    }

    /// Returns the digest of the optimized program.
    pub fn hash(&self) -> Vec<u8> {
        self.optimized.hash()
    }
}
