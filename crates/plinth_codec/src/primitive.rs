//! Fast-path conversion rules for each primitive.

use plinth_common::Data;
use plinth_schema::Primitive;

use crate::address::{Address, Credential, StakingCredential, StakingHash};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::real::Real;
use crate::shape::{
    child, data_bytes, data_constr, data_int, data_list_of, data_map, data_sized_bytes, index,
    invalid, unexpected, value_bytes, value_field, value_int, value_sized_bytes,
};
use crate::value::Value;

const TX_ID_LEN: usize = 32;

pub(crate) fn encode_primitive(
    primitive: Primitive,
    value: &Value,
    path: &str,
    config: &CodecConfig,
) -> Result<Data, CodecError> {
    match primitive {
        Primitive::Bool => match value {
            Value::Bool(b) => Ok(Data::constr(u64::from(*b), Vec::new())),
            other => Err(unexpected(path, primitive, other)),
        },
        Primitive::Int | Primitive::Time | Primitive::Duration => {
            Ok(Data::Int(value_int(value, path, primitive)?))
        }
        Primitive::Real => encode_real(value, path),
        Primitive::ByteArray => Ok(Data::Bytes(value_bytes(value, path, primitive)?)),
        Primitive::String => match value {
            Value::Text(s) => Ok(Data::Bytes(s.as_bytes().to_vec())),
            other => Err(unexpected(path, primitive, other)),
        },
        // `Value::Data` is passed through before primitives are consulted.
        Primitive::Data => Err(unexpected(path, primitive, value)),
        Primitive::PubKeyHash
        | Primitive::ValidatorHash
        | Primitive::MintingPolicyHash
        | Primitive::StakingValidatorHash
        | Primitive::ScriptHash
        | Primitive::DatumHash => {
            let len = primitive.hash_length().unwrap_or_default();
            Ok(Data::Bytes(value_sized_bytes(value, path, primitive, len)?))
        }
        Primitive::TxId => encode_tx_id(value, path),
        Primitive::TxOutputId => encode_tx_output_id(value, path),
        Primitive::Credential => Ok(Credential::from_value(value, path)?.to_data()),
        Primitive::StakingHash => Ok(StakingHash::from_value(value, path)?.to_data()),
        Primitive::StakingCredential => Ok(StakingCredential::from_value(value, path)?.to_data()),
        Primitive::Address => Ok(Address::from_value(value, path, config.is_mainnet)?.to_data()),
        Primitive::AssetClass => encode_asset_class(value, path),
        Primitive::Value => encode_assets(value, path),
        Primitive::Ratio => encode_ratio(value, path),
    }
}

pub(crate) fn decode_primitive(
    primitive: Primitive,
    data: &Data,
    path: &str,
    config: &CodecConfig,
) -> Result<Value, CodecError> {
    match primitive {
        Primitive::Bool => {
            let (tag, _) = data_constr(data, path, &[0, 0])?;
            Ok(Value::Bool(tag == 1))
        }
        Primitive::Int | Primitive::Time | Primitive::Duration => {
            Ok(Value::Int(data_int(data, path)?))
        }
        Primitive::Real => Ok(Value::Real(Real::from_scaled(data_int(data, path)?))),
        Primitive::ByteArray => Ok(Value::Bytes(data_bytes(data, path)?.to_vec())),
        Primitive::String => {
            let bytes = data_bytes(data, path)?;
            String::from_utf8(bytes.to_vec())
                .map(Value::Text)
                .map_err(|_| CodecError::InvalidUtf8 {
                    path: path.to_string(),
                })
        }
        Primitive::Data => Ok(Value::Data(data.clone())),
        Primitive::PubKeyHash
        | Primitive::ValidatorHash
        | Primitive::MintingPolicyHash
        | Primitive::StakingValidatorHash
        | Primitive::ScriptHash
        | Primitive::DatumHash => {
            let len = primitive.hash_length().unwrap_or_default();
            Ok(Value::Bytes(data_sized_bytes(data, path, primitive, len)?))
        }
        Primitive::TxId => Ok(Value::Bytes(decode_tx_id(data, path)?)),
        Primitive::TxOutputId => {
            let (_, fields) = data_constr(data, path, &[2])?;
            let tx_id = decode_tx_id(&fields[0], &index(path, 0))?;
            let output_index = data_int(&fields[1], &index(path, 1))?;
            Ok(Value::record([
                ("tx_id", Value::Bytes(tx_id)),
                ("index", Value::Int(output_index)),
            ]))
        }
        Primitive::Credential => Ok(Credential::from_data(data, path)?.to_value()),
        Primitive::StakingHash => Ok(StakingHash::from_data(data, path)?.to_value()),
        Primitive::StakingCredential => Ok(StakingCredential::from_data(data, path)?.to_value()),
        Primitive::Address => Ok(Value::Address(Address::from_data(
            data,
            path,
            config.is_mainnet,
        )?)),
        Primitive::AssetClass => {
            let (_, fields) = data_constr(data, path, &[2])?;
            let mph = data_bytes(&fields[0], &index(path, 0))?;
            let token = data_bytes(&fields[1], &index(path, 1))?;
            Ok(Value::record([
                ("mph", Value::Bytes(mph.to_vec())),
                ("token_name", Value::Bytes(token.to_vec())),
            ]))
        }
        Primitive::Value => decode_assets(data, path),
        Primitive::Ratio => {
            let items = data_list_of(data, path, 2)?;
            let top = data_int(&items[0], &index(path, 0))?;
            let bottom = data_int(&items[1], &index(path, 1))?;
            if bottom == 0 {
                return Err(CodecError::InvalidData {
                    path: index(path, 1),
                    reason: "ratio denominator is zero".to_string(),
                });
            }
            Ok(Value::record([
                ("top", Value::Int(top)),
                ("bottom", Value::Int(bottom)),
            ]))
        }
    }
}

fn encode_real(value: &Value, path: &str) -> Result<Data, CodecError> {
    let real = match value {
        Value::Real(r) => *r,
        Value::Int(n) => {
            Real::from_int(*n).ok_or_else(|| invalid(path, format!("{n} overflows a Real")))?
        }
        Value::Text(s) => s.parse::<Real>().map_err(|e| invalid(path, e.to_string()))?,
        other => return Err(unexpected(path, Primitive::Real, other)),
    };
    Ok(Data::Int(real.scaled()))
}

fn encode_tx_id(value: &Value, path: &str) -> Result<Data, CodecError> {
    let bytes = value_sized_bytes(value, path, Primitive::TxId, TX_ID_LEN)?;
    Ok(Data::constr(0, vec![Data::Bytes(bytes)]))
}

fn decode_tx_id(data: &Data, path: &str) -> Result<Vec<u8>, CodecError> {
    let (_, fields) = data_constr(data, path, &[1])?;
    data_sized_bytes(&fields[0], &index(path, 0), Primitive::TxId, TX_ID_LEN)
}

/// Accepts `{tx_id, index}` or the text form `<hex>#<index>`.
fn encode_tx_output_id(value: &Value, path: &str) -> Result<Data, CodecError> {
    let (tx_id, output_index) = match value {
        Value::Record(_) => {
            let tx_id = encode_tx_id(value_field(value, path, "tx_id")?, &child(path, "tx_id"))?;
            let output_index = value_int(
                value_field(value, path, "index")?,
                &child(path, "index"),
                Primitive::Int,
            )?;
            (tx_id, output_index)
        }
        Value::Text(s) => {
            let (id, idx) = s
                .split_once('#')
                .ok_or_else(|| invalid(path, format!("'{s}' is not of the form <txid>#<index>")))?;
            let tx_id = encode_tx_id(&Value::text(id), path)?;
            let output_index = value_int(&Value::text(idx), path, Primitive::Int)?;
            (tx_id, output_index)
        }
        other => return Err(unexpected(path, Primitive::TxOutputId, other)),
    };
    Ok(Data::constr(0, vec![tx_id, Data::Int(output_index)]))
}

/// Accepts `{mph, token_name}` or the text form `<mph hex>.<token hex>`.
fn encode_asset_class(value: &Value, path: &str) -> Result<Data, CodecError> {
    let (mph, token) = match value {
        Value::Record(_) => (
            value_bytes(value_field(value, path, "mph")?, &child(path, "mph"), Primitive::ByteArray)?,
            value_bytes(
                value_field(value, path, "token_name")?,
                &child(path, "token_name"),
                Primitive::ByteArray,
            )?,
        ),
        Value::Text(s) => {
            let (mph, token) = s
                .split_once('.')
                .ok_or_else(|| invalid(path, format!("'{s}' is not of the form <mph>.<token>")))?;
            (
                value_bytes(&Value::text(mph), path, Primitive::ByteArray)?,
                value_bytes(&Value::text(token), path, Primitive::ByteArray)?,
            )
        }
        other => return Err(unexpected(path, Primitive::AssetClass, other)),
    };
    Ok(Data::constr(0, vec![Data::Bytes(mph), Data::Bytes(token)]))
}

/// Accepts a bare lovelace amount or a policy -> token -> quantity map.
fn encode_assets(value: &Value, path: &str) -> Result<Data, CodecError> {
    match value {
        Value::Int(lovelace) => Ok(Data::Map(vec![(
            Data::Bytes(Vec::new()),
            Data::Map(vec![(Data::Bytes(Vec::new()), Data::Int(*lovelace))]),
        )])),
        Value::Map(policies) => {
            let mut out = Vec::with_capacity(policies.len());
            for (i, (policy, tokens)) in policies.iter().enumerate() {
                let policy_path = index(path, i);
                let policy = value_bytes(policy, &policy_path, Primitive::MintingPolicyHash)?;
                let Value::Map(tokens) = tokens else {
                    return Err(unexpected(&policy_path, "Map[ByteArray]Int", tokens));
                };
                let mut inner = Vec::with_capacity(tokens.len());
                for (j, (name, qty)) in tokens.iter().enumerate() {
                    let token_path = index(&policy_path, j);
                    inner.push((
                        Data::Bytes(value_bytes(name, &token_path, Primitive::ByteArray)?),
                        Data::Int(value_int(qty, &token_path, Primitive::Int)?),
                    ));
                }
                out.push((Data::Bytes(policy), Data::Map(inner)));
            }
            Ok(Data::Map(out))
        }
        other => Err(unexpected(path, Primitive::Value, other)),
    }
}

fn decode_assets(data: &Data, path: &str) -> Result<Value, CodecError> {
    let policies = data_map(data, path)?;
    let mut out = Vec::with_capacity(policies.len());
    for (i, (policy, tokens)) in policies.iter().enumerate() {
        let policy_path = index(path, i);
        let policy = data_bytes(policy, &policy_path)?;
        let tokens = data_map(tokens, &policy_path)?;
        let mut inner = Vec::with_capacity(tokens.len());
        for (j, (name, qty)) in tokens.iter().enumerate() {
            let token_path = index(&policy_path, j);
            inner.push((
                Value::Bytes(data_bytes(name, &token_path)?.to_vec()),
                Value::Int(data_int(qty, &token_path)?),
            ));
        }
        out.push((Value::Bytes(policy.to_vec()), Value::Map(inner)));
    }
    Ok(Value::Map(out))
}

/// Accepts `{top, bottom}` or a two-element list.
fn encode_ratio(value: &Value, path: &str) -> Result<Data, CodecError> {
    let (top, bottom) = match value {
        Value::Record(_) => (
            value_int(value_field(value, path, "top")?, &child(path, "top"), Primitive::Int)?,
            value_int(
                value_field(value, path, "bottom")?,
                &child(path, "bottom"),
                Primitive::Int,
            )?,
        ),
        Value::List(items) if items.len() == 2 => (
            value_int(&items[0], &index(path, 0), Primitive::Int)?,
            value_int(&items[1], &index(path, 1), Primitive::Int)?,
        ),
        other => return Err(unexpected(path, Primitive::Ratio, other)),
    };
    if bottom == 0 {
        return Err(invalid(path, "ratio denominator is zero"));
    }
    Ok(Data::List(vec![Data::Int(top), Data::Int(bottom)]))
}
