//! The interface to the language front-end.
//!
//! The compiler never parses or optimizes source itself. It hands each
//! validator to a [`Toolchain`] together with a [`CompileOptions`] that
//! describes every other validator's digest (or a placeholder for it), and
//! receives a program back.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use plinth_common::{Data, Program, ProgramLoader, ProgramPair};
use plinth_schema::{Primitive, TypeSchema};

/// How one validator is visible to another during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRef {
    /// Validator name.
    pub name: String,
    /// Primitive the digest is typed as.
    pub hash_type: Primitive,
    /// Position of the validator in name order.
    pub index: usize,
    /// Digest, or empty while it is not yet known.
    pub hash: Vec<u8>,
}

impl ValidatorRef {
    /// Whether the digest is still a placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.hash.is_empty()
    }
}

/// Settings for one front-end invocation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Produce the optimized program.
    pub optimize: bool,
    /// Network flag.
    pub is_mainnet: bool,
    /// Every validator of the set, in name order.
    pub validators: Vec<ValidatorRef>,
    /// The validator's own digest, when already known.
    pub own_hash: Option<Vec<u8>>,
    /// Whether the validator embeds its own digest.
    pub depends_on_own_hash: bool,
    /// Values substituted for named parameters.
    pub parameters: BTreeMap<String, Data>,
    /// User functions already harvested; the front-end skips them.
    pub excluded_user_funcs: BTreeSet<String>,
}

/// A request to compile one validator.
#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    /// Validator name.
    pub name: &'a str,
    /// Main source.
    pub source: &'a str,
    /// `(name, source)` of each imported module.
    pub modules: Vec<(&'a str, &'a str)>,
    /// Settings.
    pub options: &'a CompileOptions,
}

/// Optional diagnostic artifacts of a compiled program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    /// Intermediate representation.
    pub ir: Option<String>,
    /// Source map.
    pub source_map: Option<String>,
}

/// A compiled validator program.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The program.
    pub program: Arc<dyn Program>,
    /// Diagnostics for the program.
    pub debug: DebugInfo,
}

/// A declared user-function argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument name.
    pub name: String,
    /// Argument schema. For optional arguments this is the schema of the
    /// present value.
    pub schema: TypeSchema,
    /// Whether the argument may be omitted.
    pub optional: bool,
}

impl Argument {
    /// A required argument.
    pub fn required(name: impl Into<String>, schema: TypeSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
        }
    }

    /// An optional argument.
    pub fn optional(name: impl Into<String>, schema: TypeSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: true,
        }
    }
}

/// How a user function is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncSignature {
    /// Declared arguments in order.
    pub arguments: Vec<Argument>,
    /// Return schema; `None` returns the raw result.
    pub returns: Option<TypeSchema>,
    /// Append the script context after the declared arguments.
    pub requires_context: bool,
    /// Append the current validator's index after the context.
    pub requires_current_validator: bool,
}

/// A user function compiled as a by-product of a validator.
#[derive(Debug, Clone)]
pub struct HarvestedFunc {
    /// Qualified function name.
    pub name: String,
    /// Optimized and unoptimized programs.
    pub programs: ProgramPair,
    /// Diagnostics for the optimized program.
    pub debug: DebugInfo,
    /// Diagnostics for the unoptimized program.
    pub unoptimized_debug: DebugInfo,
    /// Call signature.
    pub signature: FuncSignature,
}

/// The front-end rejected a source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FrontendError {
    /// Front-end diagnostic text.
    pub message: String,
}

impl FrontendError {
    /// Creates a front-end error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The language front-end.
pub trait Toolchain: ProgramLoader {
    /// Version string, part of every cache key.
    fn version(&self) -> &str;

    /// Execution-format version tag of the programs this toolchain emits,
    /// passed back to [`ProgramLoader::load_program`].
    fn format_version(&self) -> &str;

    /// Compiles one validator.
    ///
    /// `on_user_func` is invoked once for every user function compiled
    /// along the way that is not listed in
    /// [`CompileOptions::excluded_user_funcs`].
    fn compile(
        &self,
        request: &CompileRequest<'_>,
        on_user_func: &mut dyn FnMut(HarvestedFunc),
    ) -> Result<CompileOutput, FrontendError>;
}
