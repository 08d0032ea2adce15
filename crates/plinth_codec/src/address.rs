//! Addresses and the credentials they are built from.
//!
//! On the wire an address carries no network; the codec configuration
//! supplies it when decoding. The raw byte form follows the Shelley address
//! layout: a header byte (`type << 4 | network`), the payment hash, then
//! either a staking hash, a stake pointer, or nothing.

use plinth_common::Data;
use plinth_schema::Primitive;

use crate::error::CodecError;
use crate::option;
use crate::shape::{
    child, data_constr, data_sized_bytes, data_u64, invalid, unexpected, value_field,
    value_sized_bytes, value_u64,
};
use crate::value::Value;

const HASH_LEN: usize = 28;

/// A payment credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Credential {
    /// Locked by a public key hash.
    PubKey(Vec<u8>),
    /// Locked by a validator hash.
    Validator(Vec<u8>),
}

/// The hash part of a staking credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StakingHash {
    /// A stake key hash.
    StakeKey(Vec<u8>),
    /// A staking validator hash.
    Validator(Vec<u8>),
}

/// A staking credential: either a hash or a pointer to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StakingCredential {
    /// A staking hash.
    Hash(StakingHash),
    /// A pointer to a stake registration certificate.
    Pointer {
        /// Slot of the registering transaction.
        slot: u64,
        /// Index of the transaction within its block.
        tx_index: u64,
        /// Index of the certificate within the transaction.
        cert_index: u64,
    },
}

/// A payment address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Network discriminator.
    pub is_mainnet: bool,
    /// Payment part.
    pub payment: Credential,
    /// Optional delegation part.
    pub staking: Option<StakingCredential>,
}

/// Decodes the two-way hash choice shared by credentials and staking hashes.
fn hash_choice(
    data: &Data,
    path: &str,
    names: [Primitive; 2],
) -> Result<(u64, Vec<u8>), CodecError> {
    let (tag, fields) = data_constr(data, path, &[1, 1])?;
    let primitive = names[tag as usize];
    let bytes = data_sized_bytes(&fields[0], &format!("{path}[0]"), primitive, HASH_LEN)?;
    Ok((tag, bytes))
}

/// Reads the `hash` field of a two-way hash variant value.
fn hash_variant<'v>(
    value: &'v Value,
    path: &str,
    expected: Primitive,
) -> Result<(&'v str, Vec<u8>), CodecError> {
    let Value::Variant { name, .. } = value else {
        return Err(unexpected(path, expected, value));
    };
    let hash_path = child(path, "hash");
    let hash = value_sized_bytes(
        value_field(value, path, "hash")?,
        &hash_path,
        expected,
        HASH_LEN,
    )?;
    Ok((name.as_str(), hash))
}

impl Credential {
    /// Returns the 28-byte hash.
    pub fn hash(&self) -> &[u8] {
        match self {
            Self::PubKey(h) | Self::Validator(h) => h,
        }
    }

    /// Encodes as `Constr 0 [pkh]` or `Constr 1 [vh]`.
    pub fn to_data(&self) -> Data {
        match self {
            Self::PubKey(h) => Data::constr(0, vec![Data::Bytes(h.clone())]),
            Self::Validator(h) => Data::constr(1, vec![Data::Bytes(h.clone())]),
        }
    }

    /// Decodes strictly.
    pub fn from_data(data: &Data, path: &str) -> Result<Self, CodecError> {
        let (tag, hash) = hash_choice(data, path, [Primitive::PubKeyHash, Primitive::ValidatorHash])?;
        Ok(if tag == 0 {
            Self::PubKey(hash)
        } else {
            Self::Validator(hash)
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        let (name, hash) = match self {
            Self::PubKey(h) => ("PubKey", h),
            Self::Validator(h) => ("Validator", h),
        };
        Value::variant(name, [("hash", Value::Bytes(hash.clone()))])
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> Result<Self, CodecError> {
        let (name, hash) = hash_variant(value, path, Primitive::Credential)?;
        match name {
            "PubKey" => Ok(Self::PubKey(hash)),
            "Validator" => Ok(Self::Validator(hash)),
            other => Err(CodecError::UnknownVariant {
                path: path.to_string(),
                name: other.to_string(),
            }),
        }
    }
}

impl StakingHash {
    /// Encodes as `Constr 0 [pkh]` or `Constr 1 [svh]`.
    pub fn to_data(&self) -> Data {
        match self {
            Self::StakeKey(h) => Data::constr(0, vec![Data::Bytes(h.clone())]),
            Self::Validator(h) => Data::constr(1, vec![Data::Bytes(h.clone())]),
        }
    }

    /// Decodes strictly.
    pub fn from_data(data: &Data, path: &str) -> Result<Self, CodecError> {
        let (tag, hash) = hash_choice(
            data,
            path,
            [Primitive::PubKeyHash, Primitive::StakingValidatorHash],
        )?;
        Ok(if tag == 0 {
            Self::StakeKey(hash)
        } else {
            Self::Validator(hash)
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        let (name, hash) = match self {
            Self::StakeKey(h) => ("StakeKey", h),
            Self::Validator(h) => ("Validator", h),
        };
        Value::variant(name, [("hash", Value::Bytes(hash.clone()))])
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> Result<Self, CodecError> {
        let (name, hash) = hash_variant(value, path, Primitive::StakingHash)?;
        match name {
            "StakeKey" => Ok(Self::StakeKey(hash)),
            "Validator" => Ok(Self::Validator(hash)),
            other => Err(CodecError::UnknownVariant {
                path: path.to_string(),
                name: other.to_string(),
            }),
        }
    }
}

impl StakingCredential {
    /// Encodes as `Constr 0 [hash]` or `Constr 1 [slot, tx, cert]`.
    pub fn to_data(&self) -> Data {
        match self {
            Self::Hash(h) => Data::constr(0, vec![h.to_data()]),
            Self::Pointer {
                slot,
                tx_index,
                cert_index,
            } => Data::constr(
                1,
                vec![
                    Data::Int(i128::from(*slot)),
                    Data::Int(i128::from(*tx_index)),
                    Data::Int(i128::from(*cert_index)),
                ],
            ),
        }
    }

    /// Decodes strictly.
    pub fn from_data(data: &Data, path: &str) -> Result<Self, CodecError> {
        let (tag, fields) = data_constr(data, path, &[1, 3])?;
        if tag == 0 {
            return Ok(Self::Hash(StakingHash::from_data(
                &fields[0],
                &format!("{path}[0]"),
            )?));
        }
        Ok(Self::Pointer {
            slot: data_u64(&fields[0], &format!("{path}[0]"))?,
            tx_index: data_u64(&fields[1], &format!("{path}[1]"))?,
            cert_index: data_u64(&fields[2], &format!("{path}[2]"))?,
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Hash(h) => Value::variant("Hash", [("hash", h.to_value())]),
            Self::Pointer {
                slot,
                tx_index,
                cert_index,
            } => Value::variant(
                "Pointer",
                [
                    ("slot", Value::Int(i128::from(*slot))),
                    ("tx_index", Value::Int(i128::from(*tx_index))),
                    ("cert_index", Value::Int(i128::from(*cert_index))),
                ],
            ),
        }
    }

    pub(crate) fn from_value(value: &Value, path: &str) -> Result<Self, CodecError> {
        let Value::Variant { name, .. } = value else {
            return Err(unexpected(path, Primitive::StakingCredential, value));
        };
        match name.as_str() {
            "Hash" => Ok(Self::Hash(StakingHash::from_value(
                value_field(value, path, "hash")?,
                &child(path, "hash"),
            )?)),
            "Pointer" => {
                let nat = |field: &str| {
                    value_u64(value_field(value, path, field)?, &child(path, field))
                };
                Ok(Self::Pointer {
                    slot: nat("slot")?,
                    tx_index: nat("tx_index")?,
                    cert_index: nat("cert_index")?,
                })
            }
            other => Err(CodecError::UnknownVariant {
                path: path.to_string(),
                name: other.to_string(),
            }),
        }
    }
}

impl Address {
    /// Encodes as `Constr 0 [credential, option staking]`.
    pub fn to_data(&self) -> Data {
        Data::constr(
            0,
            vec![
                self.payment.to_data(),
                option::wrap(self.staking.as_ref().map(StakingCredential::to_data)),
            ],
        )
    }

    /// Decodes strictly, stamping the given network.
    pub fn from_data(data: &Data, path: &str, is_mainnet: bool) -> Result<Self, CodecError> {
        let (_, fields) = data_constr(data, path, &[2])?;
        let payment = Credential::from_data(&fields[0], &format!("{path}[0]"))?;
        let staking_path = format!("{path}[1]");
        let staking = option::unwrap(&fields[1], &staking_path)?
            .map(|d| StakingCredential::from_data(d, &staking_path))
            .transpose()?;
        Ok(Self {
            is_mainnet,
            payment,
            staking,
        })
    }

    /// Serializes to the raw Shelley address bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let script_payment = matches!(self.payment, Credential::Validator(_));
        let kind: u8 = match &self.staking {
            Some(StakingCredential::Hash(StakingHash::StakeKey(_))) => 0,
            Some(StakingCredential::Hash(StakingHash::Validator(_))) => 2,
            Some(StakingCredential::Pointer { .. }) => 4,
            None => 6,
        } + u8::from(script_payment);
        let mut out = vec![(kind << 4) | u8::from(self.is_mainnet)];
        out.extend_from_slice(self.payment.hash());
        match &self.staking {
            Some(StakingCredential::Hash(StakingHash::StakeKey(h) | StakingHash::Validator(h))) => {
                out.extend_from_slice(h);
            }
            Some(StakingCredential::Pointer {
                slot,
                tx_index,
                cert_index,
            }) => {
                for n in [*slot, *tx_index, *cert_index] {
                    write_varint(&mut out, n);
                }
            }
            None => {}
        }
        out
    }

    /// Parses raw Shelley address bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let (&header, rest) = bytes.split_first().ok_or("empty address")?;
        let kind = header >> 4;
        let is_mainnet = match header & 0x0f {
            0 => false,
            1 => true,
            other => return Err(format!("unknown network id {other}")),
        };
        if kind > 7 {
            return Err(format!("unsupported address type {kind}"));
        }
        if rest.len() < HASH_LEN {
            return Err(format!("address too short: {} bytes", bytes.len()));
        }
        let (payment_hash, tail) = rest.split_at(HASH_LEN);
        let payment = if kind & 1 == 0 {
            Credential::PubKey(payment_hash.to_vec())
        } else {
            Credential::Validator(payment_hash.to_vec())
        };
        let staking = match kind >> 1 {
            0 | 1 => {
                if tail.len() != HASH_LEN {
                    return Err(format!("staking hash must be {HASH_LEN} bytes, got {}", tail.len()));
                }
                Some(StakingCredential::Hash(if kind >> 1 == 0 {
                    StakingHash::StakeKey(tail.to_vec())
                } else {
                    StakingHash::Validator(tail.to_vec())
                }))
            }
            2 => {
                let mut cursor = tail;
                let slot = read_varint(&mut cursor)?;
                let tx_index = read_varint(&mut cursor)?;
                let cert_index = read_varint(&mut cursor)?;
                if !cursor.is_empty() {
                    return Err("trailing bytes after stake pointer".to_string());
                }
                Some(StakingCredential::Pointer {
                    slot,
                    tx_index,
                    cert_index,
                })
            }
            _ => {
                if !tail.is_empty() {
                    return Err("trailing bytes after enterprise address".to_string());
                }
                None
            }
        };
        Ok(Self {
            is_mainnet,
            payment,
            staking,
        })
    }

    /// Hex form of [`Address::to_bytes`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Accepts a structured address, raw address bytes, or their hex text,
    /// and checks the network.
    pub(crate) fn from_value(value: &Value, path: &str, is_mainnet: bool) -> Result<Self, CodecError> {
        let address = match value {
            Value::Address(a) => a.clone(),
            Value::Bytes(b) => Self::from_bytes(b).map_err(|e| invalid(path, e))?,
            Value::Text(s) => {
                let bytes = hex::decode(s)
                    .map_err(|e| invalid(path, format!("'{s}' is not valid hex: {e}")))?;
                Self::from_bytes(&bytes).map_err(|e| invalid(path, e))?
            }
            other => return Err(unexpected(path, Primitive::Address, other)),
        };
        if address.is_mainnet != is_mainnet {
            return Err(CodecError::NetworkMismatch {
                path: path.to_string(),
                expected_mainnet: is_mainnet,
            });
        }
        if address.payment.hash().len() != HASH_LEN {
            return Err(CodecError::ByteLength {
                path: path.to_string(),
                primitive: Primitive::Address.name(),
                expected: HASH_LEN,
                actual: address.payment.hash().len(),
            });
        }
        Ok(address)
    }
}

fn write_varint(out: &mut Vec<u8>, mut n: u64) {
    let mut groups = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        groups.push(((n & 0x7f) as u8) | 0x80);
        n >>= 7;
    }
    out.extend(groups.iter().rev());
}

fn read_varint(cursor: &mut &[u8]) -> Result<u64, String> {
    let mut n: u64 = 0;
    loop {
        let (&byte, rest) = cursor.split_first().ok_or("truncated stake pointer")?;
        *cursor = rest;
        n = n
            .checked_mul(128)
            .ok_or("stake pointer component overflows")?
            | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(n);
        }
    }
}
