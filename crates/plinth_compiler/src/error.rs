//! Error types for building validator sets and calling user functions.

use std::path::PathBuf;

use plinth_cache::CacheError;
use plinth_codec::CodecError;
use plinth_common::LoadError;
use plinth_config::ConfigError;
use plinth_schema::SchemaError;

use crate::toolchain::FrontendError;

/// Errors that abort a build.
///
/// None of these are retried. A build that fails leaves the cache
/// untouched.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Hash dependencies form a cycle.
    #[error("hash dependency cycle between {}", .validators.join(", "))]
    DependencyCycle {
        /// Validators in the strongly connected components of the cycle, sorted.
        validators: Vec<String>,
    },

    /// A purpose tag is not recognized.
    #[error("validator '{validator}' has unknown purpose '{purpose}'")]
    UnknownPurpose {
        /// The validator declaring the purpose.
        validator: String,
        /// The unrecognized tag.
        purpose: String,
    },

    /// A spending validator has no datum schema.
    #[error("spending validator '{validator}' has no datum type")]
    MissingDatum {
        /// The validator missing its datum.
        validator: String,
    },

    /// A validator imports a module that is not part of the set.
    #[error("validator '{validator}' imports unknown module '{module}'")]
    UnknownModule {
        /// The importing validator.
        validator: String,
        /// The missing module.
        module: String,
    },

    /// A validator embeds the hash of a validator that is not part of the set.
    #[error("validator '{validator}' depends on the hash of unknown validator '{dependency}'")]
    UnknownDependency {
        /// The dependent validator.
        validator: String,
        /// The missing dependency.
        dependency: String,
    },

    /// An expected digest names a validator that is not part of the set.
    #[error("expected hash given for unknown validator '{validator}'")]
    UnknownValidator {
        /// The unknown name.
        validator: String,
    },

    /// A built digest differs from the declared expected digest.
    #[error("hash of validator '{validator}' changed: expected {expected}, got {actual}")]
    HashMismatch {
        /// The validator whose digest differs.
        validator: String,
        /// Expected digest, as hex.
        expected: String,
        /// Actual digest, as hex.
        actual: String,
    },

    /// A redeemer or datum schema is malformed.
    #[error("validator '{validator}' has an invalid schema: {source}")]
    InvalidSchema {
        /// The validator declaring the schema.
        validator: String,
        /// The structural problem.
        source: SchemaError,
    },

    /// The front-end failed to compile a validator.
    #[error("failed to compile validator '{validator}': {source}")]
    Frontend {
        /// The validator being compiled.
        validator: String,
        /// The front-end's error.
        source: FrontendError,
    },

    /// A cached program could not be loaded back.
    #[error("failed to load cached program '{name}': {source}")]
    ProgramLoad {
        /// Validator or user-function name.
        name: String,
        /// The loader's error.
        source: LoadError,
    },

    /// A cache record is structurally valid JSON but inconsistent.
    #[error("corrupt cache record: {reason}")]
    CorruptCacheRecord {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Writing to the cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The project configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from calling a harvested user function.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// A required argument was not supplied.
    #[error("{func}: missing argument '{argument}'")]
    MissingArgument {
        /// The function called.
        func: String,
        /// The missing argument.
        argument: String,
    },

    /// An argument was supplied that the function does not declare.
    #[error("{func}: unknown argument '{argument}'")]
    UnknownArgument {
        /// The function called.
        func: String,
        /// The unexpected argument.
        argument: String,
    },

    /// The same argument was supplied more than once.
    #[error("{func}: argument '{argument}' supplied more than once")]
    DuplicateArgument {
        /// The function called.
        func: String,
        /// The repeated argument.
        argument: String,
    },

    /// The function needs the script context and none was supplied.
    #[error("{func}: requires a script context")]
    MissingContext {
        /// The function called.
        func: String,
    },

    /// The function needs the current validator and none was supplied.
    #[error("{func}: requires the current validator")]
    MissingCurrentValidator {
        /// The function called.
        func: String,
    },

    /// The supplied current validator is not part of the build.
    #[error("{func}: unknown validator '{validator}'")]
    UnknownValidator {
        /// The function called.
        func: String,
        /// The unknown name.
        validator: String,
    },

    /// An argument or the result did not match its schema.
    #[error("{func}: {source}")]
    Codec {
        /// The function called.
        func: String,
        /// The codec's error.
        source: CodecError,
    },

    /// Evaluation failed.
    #[error("{func}: evaluation failed: {message}")]
    EvalFailed {
        /// The function called.
        func: String,
        /// The engine's message.
        message: String,
    },

    /// The optimized and unoptimized programs disagree.
    #[error("{func}: optimized program returned {optimized} but unoptimized returned {unoptimized}")]
    OptimizerDivergence {
        /// The function called.
        func: String,
        /// Outcome of the optimized program.
        optimized: String,
        /// Outcome of the unoptimized program.
        unoptimized: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_lists_members() {
        let err = BuildError::DependencyCycle {
            validators: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "hash dependency cycle between a, b");
    }

    #[test]
    fn hash_mismatch_names_both_digests() {
        let err = BuildError::HashMismatch {
            validator: "vault".to_string(),
            expected: "00ff".to_string(),
            actual: "abcd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("00ff"));
        assert!(msg.contains("abcd"));
    }

    #[test]
    fn eval_failed_carries_message() {
        let err = CallError::EvalFailed {
            func: "fee".to_string(),
            message: "out of budget".to_string(),
        };
        assert_eq!(err.to_string(), "fee: evaluation failed: out of budget");
    }
}
