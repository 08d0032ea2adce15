//! Shape accessors shared by the encoder, decoder, and primitive rules.
//!
//! The `data_*` helpers are strict and back decoding. The `value_*` helpers
//! accept every host representation the encoder allows.

use std::fmt::Display;

use plinth_common::{Data, DataKind};
use plinth_schema::Primitive;

use crate::error::CodecError;
use crate::value::Value;

pub(crate) fn child(path: &str, name: &str) -> String {
    format!("{path}.{name}")
}

pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

fn mismatch(path: &str, expected: DataKind, data: &Data) -> CodecError {
    CodecError::KindMismatch {
        path: path.to_string(),
        expected,
        actual: data.kind(),
    }
}

pub(crate) fn data_int(data: &Data, path: &str) -> Result<i128, CodecError> {
    match data {
        Data::Int(n) => Ok(*n),
        other => Err(mismatch(path, DataKind::Int, other)),
    }
}

pub(crate) fn data_bytes<'d>(data: &'d Data, path: &str) -> Result<&'d [u8], CodecError> {
    match data {
        Data::Bytes(b) => Ok(b),
        other => Err(mismatch(path, DataKind::Bytes, other)),
    }
}

pub(crate) fn data_list<'d>(data: &'d Data, path: &str) -> Result<&'d [Data], CodecError> {
    match data {
        Data::List(items) => Ok(items),
        other => Err(mismatch(path, DataKind::List, other)),
    }
}

pub(crate) fn data_map<'d>(data: &'d Data, path: &str) -> Result<&'d [(Data, Data)], CodecError> {
    match data {
        Data::Map(pairs) => Ok(pairs),
        other => Err(mismatch(path, DataKind::Map, other)),
    }
}

/// Reads a list of exactly `expected` elements.
pub(crate) fn data_list_of<'d>(
    data: &'d Data,
    path: &str,
    expected: usize,
) -> Result<&'d [Data], CodecError> {
    let items = data_list(data, path)?;
    if items.len() != expected {
        return Err(CodecError::FieldCount {
            path: path.to_string(),
            expected,
            actual: items.len(),
        });
    }
    Ok(items)
}

/// Reads a constructor whose tag indexes `arities` and whose field count
/// equals `arities[tag]`.
pub(crate) fn data_constr<'d>(
    data: &'d Data,
    path: &str,
    arities: &[usize],
) -> Result<(u64, &'d [Data]), CodecError> {
    let Data::Constr { tag, fields } = data else {
        return Err(mismatch(path, DataKind::Constr, data));
    };
    let expected = usize::try_from(*tag)
        .ok()
        .and_then(|t| arities.get(t).copied())
        .ok_or_else(|| CodecError::TagOutOfRange {
            path: path.to_string(),
            tag: *tag,
            count: arities.len(),
        })?;
    if fields.len() != expected {
        return Err(CodecError::FieldCount {
            path: path.to_string(),
            expected,
            actual: fields.len(),
        });
    }
    Ok((*tag, fields))
}

/// Reads bytes whose length is fixed by a hash-like primitive.
pub(crate) fn data_sized_bytes(
    data: &Data,
    path: &str,
    primitive: Primitive,
    expected: usize,
) -> Result<Vec<u8>, CodecError> {
    let bytes = data_bytes(data, path)?;
    check_length(bytes, path, primitive, expected)?;
    Ok(bytes.to_vec())
}

/// Reads a non-negative integer that fits in `u64`.
pub(crate) fn data_u64(data: &Data, path: &str) -> Result<u64, CodecError> {
    let n = data_int(data, path)?;
    u64::try_from(n).map_err(|_| CodecError::InvalidData {
        path: path.to_string(),
        reason: format!("{n} is not a valid natural number"),
    })
}

fn check_length(
    bytes: &[u8],
    path: &str,
    primitive: Primitive,
    expected: usize,
) -> Result<(), CodecError> {
    if bytes.len() != expected {
        return Err(CodecError::ByteLength {
            path: path.to_string(),
            primitive: primitive.name(),
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

pub(crate) fn unexpected(path: &str, expected: impl Display, value: &Value) -> CodecError {
    CodecError::UnexpectedValue {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: value.kind_name(),
    }
}

pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> CodecError {
    CodecError::InvalidValue {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Accepts raw bytes or hex text.
pub(crate) fn value_bytes(
    value: &Value,
    path: &str,
    expected: impl Display,
) -> Result<Vec<u8>, CodecError> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) => {
            hex::decode(s).map_err(|e| invalid(path, format!("'{s}' is not valid hex: {e}")))
        }
        other => Err(unexpected(path, expected, other)),
    }
}

/// Accepts raw bytes or hex text of a fixed length.
pub(crate) fn value_sized_bytes(
    value: &Value,
    path: &str,
    primitive: Primitive,
    expected: usize,
) -> Result<Vec<u8>, CodecError> {
    let bytes = value_bytes(value, path, primitive)?;
    check_length(&bytes, path, primitive, expected)?;
    Ok(bytes)
}

/// Accepts an integer or its decimal text.
pub(crate) fn value_int(
    value: &Value,
    path: &str,
    expected: impl Display,
) -> Result<i128, CodecError> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| invalid(path, format!("'{s}' is not a decimal integer"))),
        other => Err(unexpected(path, expected, other)),
    }
}

/// Accepts a natural number that fits in `u64`.
pub(crate) fn value_u64(value: &Value, path: &str) -> Result<u64, CodecError> {
    let n = value_int(value, path, "natural number")?;
    u64::try_from(n).map_err(|_| invalid(path, format!("{n} is not a valid natural number")))
}

/// Fetches a required named field of a record or variant.
pub(crate) fn value_field<'v>(
    value: &'v Value,
    path: &str,
    name: &str,
) -> Result<&'v Value, CodecError> {
    value.field(name).ok_or_else(|| CodecError::MissingField {
        path: path.to_string(),
        field: name.to_string(),
    })
}
