//! The flat persistence record of a completed build.
//!
//! Programs are stored as hex of their serialized bytes together with the
//! execution-format version needed to load them back. Everything else is
//! the metadata required to rebuild compiled validators and user functions.

use std::collections::BTreeMap;

use plinth_codec::CodecConfig;
use plinth_schema::TypeSchema;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// One cached build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Whether the build kept debug artifacts.
    pub debug: bool,
    /// Compiled validators by name.
    pub validators: BTreeMap<String, ValidatorRecord>,
    /// Harvested user functions by name.
    #[serde(default)]
    pub user_funcs: BTreeMap<String, UserFuncRecord>,
}

/// A compiled validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Purpose tag (`spending`, `minting`, `staking`, `mixed`).
    pub purpose: String,
    /// Digest of the optimized program, as hex.
    pub hash: String,
    /// Optimized program bytes, as hex.
    pub bytecode: String,
    /// Unoptimized program bytes, as hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_bytecode: Option<String>,
    /// Intermediate representation of the optimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir: Option<String>,
    /// Source map of the optimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    /// Intermediate representation of the unoptimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_ir: Option<String>,
    /// Source map of the unoptimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_source_map: Option<String>,
    /// Execution-format version tag of the programs.
    pub version: String,
    /// Codec configuration of the redeemer and datum.
    pub codec: CodecConfig,
    /// Redeemer schema.
    pub redeemer: TypeSchema,
    /// Datum schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<TypeSchema>,
    /// Hashes injected for each hash dependency, as hex.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// A declared user-function argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentRecord {
    /// Argument name.
    pub name: String,
    /// Argument schema.
    pub schema: TypeSchema,
    /// Whether the argument may be omitted.
    #[serde(default)]
    pub optional: bool,
}

/// A harvested user function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFuncRecord {
    /// Optimized program bytes, as hex.
    pub bytecode: String,
    /// Unoptimized program bytes, as hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_bytecode: Option<String>,
    /// Intermediate representation of the optimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir: Option<String>,
    /// Source map of the optimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    /// Intermediate representation of the unoptimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_ir: Option<String>,
    /// Source map of the unoptimized program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unoptimized_source_map: Option<String>,
    /// Execution-format version tag of the programs.
    pub version: String,
    /// Declared arguments in order.
    pub arguments: Vec<ArgumentRecord>,
    /// Return schema; absent means the raw result is returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeSchema>,
    /// Whether the ambient context is appended to the arguments.
    #[serde(default)]
    pub requires_context: bool,
    /// Whether the current validator's index is appended to the arguments.
    #[serde(default)]
    pub requires_current_validator: bool,
}

impl CacheRecord {
    /// Serializes the record as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parses a record from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::RecordParse {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use plinth_schema::Primitive;

    pub(crate) fn sample_record() -> CacheRecord {
        let mut validators = BTreeMap::new();
        validators.insert(
            "vault".to_string(),
            ValidatorRecord {
                purpose: "spending".to_string(),
                hash: "ab".repeat(28),
                bytecode: "0102".to_string(),
                unoptimized_bytecode: None,
                ir: None,
                source_map: None,
                unoptimized_ir: None,
                unoptimized_source_map: None,
                version: "v1".to_string(),
                codec: CodecConfig::new(false),
                redeemer: TypeSchema::primitive(Primitive::Int),
                datum: Some(TypeSchema::primitive(Primitive::Data)),
                dependencies: BTreeMap::from([("mint".to_string(), "cd".repeat(28))]),
            },
        );
        let mut user_funcs = BTreeMap::new();
        user_funcs.insert(
            "vault::fee".to_string(),
            UserFuncRecord {
                bytecode: "03".to_string(),
                unoptimized_bytecode: Some("0304".to_string()),
                ir: Some("(lam x x)".to_string()),
                source_map: None,
                unoptimized_ir: None,
                unoptimized_source_map: None,
                version: "v1".to_string(),
                arguments: vec![ArgumentRecord {
                    name: "amount".to_string(),
                    schema: TypeSchema::primitive(Primitive::Int),
                    optional: true,
                }],
                returns: Some(TypeSchema::primitive(Primitive::Int)),
                requires_context: false,
                requires_current_validator: true,
            },
        );
        CacheRecord {
            debug: true,
            validators,
            user_funcs,
        }
    }

    #[test]
    fn json_roundtrip() {
        let record = sample_record();
        let bytes = record.to_json().unwrap();
        assert_eq!(CacheRecord::from_json(&bytes).unwrap(), record);
    }

    #[test]
    fn absent_options_are_omitted() {
        let record = sample_record();
        let json = String::from_utf8(record.to_json().unwrap()).unwrap();
        assert!(!json.contains("unoptimized_source_map"));
        assert!(json.contains("\"purpose\":\"spending\""));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = CacheRecord::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, CacheError::RecordParse { .. }));
    }
}
