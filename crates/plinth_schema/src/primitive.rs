//! The closed set of primitive types with fixed canonical encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive type. Each variant has exactly one canonical encoding rule,
/// implemented by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// `Constr 0 []` for false, `Constr 1 []` for true.
    Bool,
    /// Arbitrary integer.
    Int,
    /// Fixed-point decimal, scaled by the codec's precision constant.
    Real,
    /// Raw bytes.
    ByteArray,
    /// UTF-8 text stored as bytes.
    String,
    /// POSIX time in milliseconds.
    Time,
    /// Duration in milliseconds.
    Duration,
    /// Any data, passed through untouched.
    Data,
    /// 28-byte public key hash.
    PubKeyHash,
    /// 28-byte spending validator hash.
    ValidatorHash,
    /// 28-byte minting policy hash.
    MintingPolicyHash,
    /// 28-byte staking validator hash.
    StakingValidatorHash,
    /// 28-byte hash of a script of any purpose.
    ScriptHash,
    /// 32-byte datum hash.
    DatumHash,
    /// 32-byte transaction id, wrapped in a constructor.
    TxId,
    /// Transaction id plus output index.
    TxOutputId,
    /// Public key or validator credential.
    Credential,
    /// Public key or staking validator hash.
    StakingHash,
    /// Staking hash or stake pointer.
    StakingCredential,
    /// Payment credential plus optional staking credential.
    Address,
    /// Minting policy hash plus token name.
    AssetClass,
    /// Multi-asset value.
    Value,
    /// Numerator and non-zero denominator.
    Ratio,
}

impl Primitive {
    /// Every primitive, in declaration order.
    pub const ALL: [Primitive; 23] = [
        Primitive::Bool,
        Primitive::Int,
        Primitive::Real,
        Primitive::ByteArray,
        Primitive::String,
        Primitive::Time,
        Primitive::Duration,
        Primitive::Data,
        Primitive::PubKeyHash,
        Primitive::ValidatorHash,
        Primitive::MintingPolicyHash,
        Primitive::StakingValidatorHash,
        Primitive::ScriptHash,
        Primitive::DatumHash,
        Primitive::TxId,
        Primitive::TxOutputId,
        Primitive::Credential,
        Primitive::StakingHash,
        Primitive::StakingCredential,
        Primitive::Address,
        Primitive::AssetClass,
        Primitive::Value,
        Primitive::Ratio,
    ];

    /// Returns the type name used in diagnostics and generated interfaces.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Real => "Real",
            Self::ByteArray => "ByteArray",
            Self::String => "String",
            Self::Time => "Time",
            Self::Duration => "Duration",
            Self::Data => "Data",
            Self::PubKeyHash => "PubKeyHash",
            Self::ValidatorHash => "ValidatorHash",
            Self::MintingPolicyHash => "MintingPolicyHash",
            Self::StakingValidatorHash => "StakingValidatorHash",
            Self::ScriptHash => "ScriptHash",
            Self::DatumHash => "DatumHash",
            Self::TxId => "TxId",
            Self::TxOutputId => "TxOutputId",
            Self::Credential => "Credential",
            Self::StakingHash => "StakingHash",
            Self::StakingCredential => "StakingCredential",
            Self::Address => "Address",
            Self::AssetClass => "AssetClass",
            Self::Value => "Value",
            Self::Ratio => "Ratio",
        }
    }

    /// Returns the required byte length for hash-like primitives encoded as
    /// bare bytes, or `None` for everything else.
    pub fn hash_length(self) -> Option<usize> {
        match self {
            Self::PubKeyHash
            | Self::ValidatorHash
            | Self::MintingPolicyHash
            | Self::StakingValidatorHash
            | Self::ScriptHash => Some(28),
            Self::DatumHash => Some(32),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_complete_and_unique() {
        let mut sorted = Primitive::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), Primitive::ALL.len());
    }

    #[test]
    fn hash_lengths() {
        assert_eq!(Primitive::PubKeyHash.hash_length(), Some(28));
        assert_eq!(Primitive::DatumHash.hash_length(), Some(32));
        assert_eq!(Primitive::TxId.hash_length(), None);
        assert_eq!(Primitive::Int.hash_length(), None);
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&Primitive::MintingPolicyHash).unwrap();
        assert_eq!(json, "\"mintingpolicyhash\"");
        let back: Primitive = serde_json::from_str("\"bytearray\"").unwrap();
        assert_eq!(back, Primitive::ByteArray);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(serde_json::from_str::<Primitive>("\"float\"").is_err());
    }
}
