//! Validator declarations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use plinth_schema::{Primitive, TypeSchema};

use crate::error::BuildError;

/// What a validator is used for on chain.
///
/// The purpose selects the hash type under which other validators see this
/// one's digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Guards outputs locked at a script address. Needs a datum.
    Spending,
    /// Guards minting and burning of a token policy.
    Minting,
    /// Guards staking rewards and certificates.
    Staking,
    /// Usable for more than one purpose.
    Mixed,
}

/// A purpose tag that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown purpose '{0}'")]
pub struct ParsePurposeError(pub String);

impl Purpose {
    /// Returns the canonical tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spending => "spending",
            Self::Minting => "minting",
            Self::Staking => "staking",
            Self::Mixed => "mixed",
        }
    }

    /// Returns the primitive under which this validator's digest is typed.
    pub fn hash_type(self) -> Primitive {
        match self {
            Self::Spending => Primitive::ValidatorHash,
            Self::Minting => Primitive::MintingPolicyHash,
            Self::Staking => Primitive::StakingValidatorHash,
            Self::Mixed => Primitive::ScriptHash,
        }
    }
}

impl FromStr for Purpose {
    type Err = ParsePurposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spending" => Ok(Self::Spending),
            "minting" => Ok(Self::Minting),
            "staking" | "rewarding" | "certifying" => Ok(Self::Staking),
            "mixed" => Ok(Self::Mixed),
            other => Err(ParsePurposeError(other.to_string())),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validator to be compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    /// Unique name within the set.
    pub name: String,
    /// Purpose.
    pub purpose: Purpose,
    /// Main source text.
    pub source: String,
    /// Names of plain modules imported by the source.
    pub modules: Vec<String>,
    /// Names of validators whose digests are embedded in this one.
    pub hash_dependencies: Vec<String>,
    /// Whether the validator embeds its own digest.
    pub depends_on_own_hash: bool,
    /// Redeemer schema.
    pub redeemer: TypeSchema,
    /// Datum schema; required for spending validators.
    pub datum: Option<TypeSchema>,
}

impl Validator {
    /// Creates a validator with no dependencies.
    pub fn new(
        name: impl Into<String>,
        purpose: Purpose,
        source: impl Into<String>,
        redeemer: TypeSchema,
    ) -> Self {
        Self {
            name: name.into(),
            purpose,
            source: source.into(),
            modules: Vec::new(),
            hash_dependencies: Vec::new(),
            depends_on_own_hash: false,
            redeemer,
            datum: None,
        }
    }

    /// Sets the datum schema.
    pub fn with_datum(mut self, datum: TypeSchema) -> Self {
        self.datum = Some(datum);
        self
    }

    /// Adds a plain module import.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Adds a hash dependency.
    pub fn with_hash_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.hash_dependencies.push(dependency.into());
        self
    }

    /// Marks the validator as embedding its own digest.
    pub fn with_own_hash(mut self) -> Self {
        self.depends_on_own_hash = true;
        self
    }

    /// Whether the own digest is embedded, either by flag or by listing
    /// itself as a hash dependency.
    pub fn needs_own_hash(&self) -> bool {
        self.depends_on_own_hash || self.hash_dependencies.iter().any(|d| d == &self.name)
    }

    /// Hash dependencies other than the validator itself.
    pub fn external_dependencies(&self) -> impl Iterator<Item = &str> {
        self.hash_dependencies
            .iter()
            .map(String::as_str)
            .filter(move |d| *d != self.name)
    }
}

/// A set of validators plus the plain modules they import.
#[derive(Debug, Clone, Default)]
pub struct ValidatorSet {
    validators: BTreeMap<String, Validator>,
    modules: BTreeMap<String, String>,
}

impl ValidatorSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a validator.
    pub fn insert(&mut self, validator: Validator) -> &mut Self {
        self.validators.insert(validator.name.clone(), validator);
        self
    }

    /// Adds or replaces a plain module.
    pub fn insert_module(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.modules.insert(name.into(), source.into());
        self
    }

    /// Returns a validator by name.
    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.validators.get(name)
    }

    /// Iterates validators sorted by name.
    pub fn validators(&self) -> impl Iterator<Item = &Validator> {
        self.validators.values()
    }

    /// Iterates module `(name, source)` pairs sorted by name.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    /// Returns a module source by name.
    pub fn module(&self, name: &str) -> Option<&str> {
        self.modules.get(name).map(String::as_str)
    }

    /// Returns the number of validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns whether the set has no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Maps each validator name to its index in name order.
    pub fn indices(&self) -> BTreeMap<String, usize> {
        self.validators
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect()
    }

    /// Checks datums and resolves every module and hash-dependency name.
    pub fn check(&self) -> Result<(), BuildError> {
        for v in self.validators.values() {
            if v.purpose == Purpose::Spending && v.datum.is_none() {
                return Err(BuildError::MissingDatum {
                    validator: v.name.clone(),
                });
            }
            if let Some(module) = v.modules.iter().find(|m| !self.modules.contains_key(*m)) {
                return Err(BuildError::UnknownModule {
                    validator: v.name.clone(),
                    module: module.clone(),
                });
            }
            if let Some(dep) = v
                .hash_dependencies
                .iter()
                .find(|d| !self.validators.contains_key(*d))
            {
                return Err(BuildError::UnknownDependency {
                    validator: v.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        Ok(())
    }
}
