//! Deterministic digest of build inputs.
//!
//! The key covers the compiler version, the debug and network flags, every
//! validator (its source and a fingerprint of its declaration), every plain
//! module, and every parameter substitution. Collections are sorted by name
//! before hashing, so the key does not depend on declaration order.

use plinth_common::{ContentHash, ContentHasher, Data};
use plinth_schema::TypeSchema;

use crate::error::CacheError;

/// The parts of a validator declaration that affect its build output.
#[derive(Debug, Clone)]
pub struct ValidatorKey<'a> {
    /// Validator name.
    pub name: &'a str,
    /// Main source text.
    pub source: &'a str,
    /// Purpose tag as written in the record.
    pub purpose: &'a str,
    /// Plain module dependencies.
    pub modules: &'a [String],
    /// Hash dependencies.
    pub hash_dependencies: &'a [String],
    /// Whether the validator embeds its own hash.
    pub depends_on_own_hash: bool,
    /// Redeemer schema.
    pub redeemer: &'a TypeSchema,
    /// Datum schema, if any.
    pub datum: Option<&'a TypeSchema>,
}

/// Everything a build digest is computed over.
#[derive(Debug, Clone, Default)]
pub struct KeyInputs<'a> {
    /// Version string of the compiler toolchain.
    pub compiler_version: &'a str,
    /// Whether debug artifacts are built.
    pub debug: bool,
    /// Network flag.
    pub is_mainnet: bool,
    /// Validator declarations, in any order.
    pub validators: Vec<ValidatorKey<'a>>,
    /// Plain module `(name, source)` pairs, in any order.
    pub modules: Vec<(&'a str, &'a str)>,
    /// Parameter substitutions, in any order.
    pub parameters: Vec<(&'a str, &'a Data)>,
}

/// Computes the cache key for a build.
pub fn cache_key(inputs: &KeyInputs<'_>) -> Result<ContentHash, CacheError> {
    let mut hasher = ContentHasher::new();
    hasher
        .write_str(inputs.compiler_version)
        .write_bool(inputs.debug)
        .write_bool(inputs.is_mainnet);

    let mut validators: Vec<&ValidatorKey<'_>> = inputs.validators.iter().collect();
    validators.sort_by(|a, b| a.name.cmp(b.name));
    hasher.write_u64(validators.len() as u64);
    for v in validators {
        hasher
            .write_str(v.name)
            .write_str(v.source)
            .write_str(v.purpose)
            .write_u64(v.modules.len() as u64);
        for m in sorted(v.modules) {
            hasher.write_str(m);
        }
        hasher.write_u64(v.hash_dependencies.len() as u64);
        for d in sorted(v.hash_dependencies) {
            hasher.write_str(d);
        }
        hasher
            .write_bool(v.depends_on_own_hash)
            .write_bytes(&schema_bytes(v.redeemer)?)
            .write_bool(v.datum.is_some());
        if let Some(datum) = v.datum {
            hasher.write_bytes(&schema_bytes(datum)?);
        }
    }

    let mut modules = inputs.modules.clone();
    modules.sort_by(|a, b| a.0.cmp(b.0));
    hasher.write_u64(modules.len() as u64);
    for (name, source) in modules {
        hasher.write_str(name).write_str(source);
    }

    let mut parameters = inputs.parameters.clone();
    parameters.sort_by(|a, b| a.0.cmp(b.0));
    hasher.write_u64(parameters.len() as u64);
    for (name, data) in parameters {
        let bytes = bincode::serde::encode_to_vec(data, bincode::config::standard()).map_err(
            |e| CacheError::Serialization {
                reason: e.to_string(),
            },
        )?;
        hasher.write_str(name).write_bytes(&bytes);
    }

    Ok(hasher.finish())
}

fn sorted(names: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = names.iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}

fn schema_bytes(schema: &TypeSchema) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(schema).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_schema::Primitive;

    fn int() -> TypeSchema {
        TypeSchema::primitive(Primitive::Int)
    }

    fn validator<'a>(name: &'a str, source: &'a str, redeemer: &'a TypeSchema) -> ValidatorKey<'a> {
        ValidatorKey {
            name,
            source,
            purpose: "minting",
            modules: &[],
            hash_dependencies: &[],
            depends_on_own_hash: false,
            redeemer,
            datum: None,
        }
    }

    fn inputs<'a>(validators: Vec<ValidatorKey<'a>>) -> KeyInputs<'a> {
        KeyInputs {
            compiler_version: "0.1.0",
            validators,
            ..KeyInputs::default()
        }
    }

    #[test]
    fn independent_of_declaration_order() {
        let r = int();
        let ab = inputs(vec![validator("a", "src a", &r), validator("b", "src b", &r)]);
        let ba = inputs(vec![validator("b", "src b", &r), validator("a", "src a", &r)]);
        assert_eq!(cache_key(&ab).unwrap(), cache_key(&ba).unwrap());
    }

    #[test]
    fn changes_with_one_source_character() {
        let r = int();
        let before = inputs(vec![validator("a", "src a", &r)]);
        let after = inputs(vec![validator("a", "src b", &r)]);
        assert_ne!(cache_key(&before).unwrap(), cache_key(&after).unwrap());
    }

    #[test]
    fn covers_flags_and_version() {
        let r = int();
        let base = inputs(vec![validator("a", "src", &r)]);
        let base_key = cache_key(&base).unwrap();

        let debug = KeyInputs { debug: true, ..base.clone() };
        let mainnet = KeyInputs { is_mainnet: true, ..base.clone() };
        let version = KeyInputs { compiler_version: "0.2.0", ..base.clone() };
        assert_ne!(cache_key(&debug).unwrap(), base_key);
        assert_ne!(cache_key(&mainnet).unwrap(), base_key);
        assert_ne!(cache_key(&version).unwrap(), base_key);
    }

    #[test]
    fn covers_declaration() {
        let int_schema = int();
        let bytes_schema = TypeSchema::primitive(Primitive::ByteArray);
        let base = cache_key(&inputs(vec![validator("a", "src", &int_schema)])).unwrap();
        let schema = cache_key(&inputs(vec![validator("a", "src", &bytes_schema)])).unwrap();
        let deps = ["b".to_string()];
        let with_dep = ValidatorKey {
            hash_dependencies: &deps,
            ..validator("a", "src", &int_schema)
        };
        let dep = cache_key(&inputs(vec![with_dep])).unwrap();
        assert_ne!(base, schema);
        assert_ne!(base, dep);
    }

    #[test]
    fn modules_and_parameters_are_order_independent() {
        let one = Data::Int(1);
        let two = Data::Int(2);
        let a = KeyInputs {
            modules: vec![("m1", "x"), ("m2", "y")],
            parameters: vec![("p", &one), ("q", &two)],
            ..KeyInputs::default()
        };
        let b = KeyInputs {
            modules: vec![("m2", "y"), ("m1", "x")],
            parameters: vec![("q", &two), ("p", &one)],
            ..KeyInputs::default()
        };
        assert_eq!(cache_key(&a).unwrap(), cache_key(&b).unwrap());

        let changed = KeyInputs {
            parameters: vec![("q", &one), ("p", &one)],
            ..a.clone()
        };
        assert_ne!(cache_key(&a).unwrap(), cache_key(&changed).unwrap());
    }
}
