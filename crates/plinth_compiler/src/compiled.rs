//! Output of a build.

use std::collections::BTreeMap;

use plinth_codec::Codec;
use plinth_common::{ContentHash, ProgramPair};
use plinth_schema::Primitive;

use crate::toolchain::DebugInfo;
use crate::user_func::UserFunc;
use crate::validator::Purpose;

/// A validator with its final programs.
#[derive(Debug, Clone)]
pub struct CompiledValidator {
    /// Validator name.
    pub name: String,
    /// Purpose.
    pub purpose: Purpose,
    /// Digest of the optimized program.
    pub hash: Vec<u8>,
    /// Optimized program plus its unoptimized counterpart.
    pub programs: ProgramPair,
    /// Execution-format version tag of the programs.
    pub version: String,
    /// Redeemer codec.
    pub redeemer: Codec,
    /// Datum codec, for validators that take one.
    pub datum: Option<Codec>,
    /// Digest injected for each hash dependency.
    pub dependencies: BTreeMap<String, Vec<u8>>,
    /// Diagnostics of the optimized program; empty unless built in debug mode.
    pub debug: DebugInfo,
    /// Diagnostics of the unoptimized program; empty unless built in debug mode.
    pub unoptimized_debug: DebugInfo,
}

impl CompiledValidator {
    /// Returns the digest as hex.
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// Returns the primitive the digest is typed as.
    pub fn hash_type(&self) -> Primitive {
        self.purpose.hash_type()
    }
}

/// Everything a build produces.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Digest of the build inputs.
    pub cache_key: ContentHash,
    /// Whether the bundle was restored from the cache.
    pub from_cache: bool,
    /// Compiled validators by name.
    pub validators: BTreeMap<String, CompiledValidator>,
    /// Harvested user functions by qualified name.
    pub user_funcs: BTreeMap<String, UserFunc>,
}

impl Bundle {
    /// Returns a compiled validator by name.
    pub fn validator(&self, name: &str) -> Option<&CompiledValidator> {
        self.validators.get(name)
    }

    /// Returns a user function by qualified name.
    pub fn user_func(&self, name: &str) -> Option<&UserFunc> {
        self.user_funcs.get(name)
    }
}
