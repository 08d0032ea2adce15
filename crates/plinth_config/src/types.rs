//! Configuration types deserialized from `plinth.toml`.

use plinth_schema::TypeSchema;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `plinth.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Build settings (network, debug artifacts).
    #[serde(default)]
    pub build: BuildConfig,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Digests the build must reproduce, as hex, keyed by validator name.
    #[serde(default)]
    pub expected_hashes: BTreeMap<String, String>,
    /// Plain module sources keyed by module name.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
    /// Validator declarations keyed by validator name.
    #[serde(default)]
    pub validators: BTreeMap<String, ValidatorConfig>,
}

/// Build configuration.
#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    /// Whether addresses and hashes target the main network.
    #[serde(default)]
    pub is_mainnet: bool,
    /// Keep unoptimized programs and debug blobs, and check user functions
    /// for optimizer divergence.
    #[serde(default)]
    pub debug: bool,
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Whether build results are cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory for persisted records, relative to the project root.
    /// Records are kept in memory when absent.
    #[serde(default)]
    pub dir: Option<String>,
    /// Serve builds from an ordered list in insertion order instead of by key.
    #[serde(default)]
    pub positional: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            positional: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single validator declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorConfig {
    /// Purpose tag (`spending`, `minting`, `staking`, `mixed`, ...).
    pub purpose: String,
    /// Path to the main source, relative to the project root.
    pub source: String,
    /// Names of plain modules this validator imports.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Names of validators whose hashes are embedded in this one.
    #[serde(default)]
    pub hash_dependencies: Vec<String>,
    /// Whether the validator embeds its own hash.
    #[serde(default)]
    pub depends_on_own_hash: bool,
    /// Redeemer schema.
    pub redeemer: TypeSchema,
    /// Datum schema, required for spending validators.
    #[serde(default)]
    pub datum: Option<TypeSchema>,
}
