//! Compilation of validator sets whose programs embed each other's digests.
//!
//! A [`ValidatorSet`] is compiled by a [`Compiler`] through an external
//! [`Toolchain`] in two passes (see [`dag`]): digests are resolved in
//! hash-dependency order with placeholders for those not yet known, then
//! every validator is recompiled with all digests in place. User functions
//! compiled along the way are harvested once each and exposed as
//! [`UserFunc`]s. Results are cached in a [`BuildCache`](plinth_cache::BuildCache)
//! under a digest of the build inputs.

#![warn(missing_docs)]

pub mod compiled;
pub mod dag;
pub mod error;
mod persist;
pub mod project;
pub mod toolchain;
pub mod user_func;
pub mod validator;

pub use compiled::{Bundle, CompiledValidator};
pub use dag::{build, BuildOptions, Compiler};
pub use error::{BuildError, CallError};
pub use project::Project;
pub use toolchain::{
    Argument, CompileOptions, CompileOutput, CompileRequest, DebugInfo, FrontendError,
    FuncSignature, HarvestedFunc, Toolchain, ValidatorRef,
};
pub use user_func::{CallArgs, UserFunc};
pub use validator::{ParsePurposeError, Purpose, Validator, ValidatorSet};
