//! Permissive encoding of host values into canonical data.

use plinth_common::Data;
use plinth_schema::{FieldSchema, TypeSchema};

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::option;
use crate::primitive::encode_primitive;
use crate::shape::{child, index, unexpected};
use crate::value::Value;
use crate::ROOT;

/// Encodes `value` as canonical data shaped by `schema`.
///
/// A [`Value::Data`] is accepted for any schema and passed through
/// unchecked. Primitives go through their fixed rule first; composite
/// schemas are encoded structurally.
pub fn encode(schema: &TypeSchema, value: &Value, config: &CodecConfig) -> Result<Data, CodecError> {
    encode_at(schema, value, ROOT, config)
}

/// Where the fields of a struct or variant come from.
enum FieldSource<'v> {
    Named(&'v [(String, Value)]),
    Positional(&'v [Value]),
}

pub(crate) fn encode_at(
    schema: &TypeSchema,
    value: &Value,
    path: &str,
    config: &CodecConfig,
) -> Result<Data, CodecError> {
    if let Value::Data(data) = value {
        return Ok(data.clone());
    }
    match schema {
        TypeSchema::Primitive { primitive } => encode_primitive(*primitive, value, path, config),
        TypeSchema::List { item } => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| encode_at(item, v, &index(path, i), config))
                .collect::<Result<Vec<_>, _>>()
                .map(Data::List),
            other => Err(unexpected(path, schema, other)),
        },
        TypeSchema::Map { key, value: val } => encode_map(schema, key, val, value, path, config),
        TypeSchema::Option { some } => match value {
            Value::Option(None) => Ok(option::wrap(None)),
            Value::Option(Some(inner)) => Ok(option::wrap(Some(encode_at(some, inner, path, config)?))),
            bare => Ok(option::wrap(Some(encode_at(some, bare, path, config)?))),
        },
        TypeSchema::Tuple { items } => match value {
            Value::List(values) => {
                if values.len() != items.len() {
                    return Err(CodecError::FieldCount {
                        path: path.to_string(),
                        expected: items.len(),
                        actual: values.len(),
                    });
                }
                items
                    .iter()
                    .zip(values)
                    .enumerate()
                    .map(|(i, (s, v))| encode_at(s, v, &index(path, i), config))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Data::List)
            }
            other => Err(unexpected(path, schema, other)),
        },
        TypeSchema::Struct { fields } => {
            let source = match value {
                Value::Record(entries) => FieldSource::Named(entries),
                Value::List(items) => FieldSource::Positional(items),
                other => return Err(unexpected(path, schema, other)),
            };
            let mut encoded = encode_fields(fields, source, path, config)?;
            if encoded.len() == 1 {
                return Ok(encoded.remove(0));
            }
            Ok(Data::List(encoded))
        }
        TypeSchema::Enum { variants } => {
            let (name, source) = variant_parts(schema, value, path)?;
            let variant = variants
                .iter()
                .find(|v| v.name == name)
                .ok_or_else(|| CodecError::UnknownVariant {
                    path: path.to_string(),
                    name: name.to_string(),
                })?;
            let fields = encode_fields(&variant.fields, source, &child(path, name), config)?;
            Ok(Data::constr(variant.tag, fields))
        }
    }
}

/// Accepts a map, a list of `[key, value]` pairs, or a record whose names
/// are the (text) keys.
fn encode_map(
    schema: &TypeSchema,
    key: &TypeSchema,
    val: &TypeSchema,
    value: &Value,
    path: &str,
    config: &CodecConfig,
) -> Result<Data, CodecError> {
    let mut out = Vec::new();
    match value {
        Value::Map(pairs) => {
            for (i, (k, v)) in pairs.iter().enumerate() {
                let p = index(path, i);
                out.push((encode_at(key, k, &p, config)?, encode_at(val, v, &p, config)?));
            }
        }
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                let p = index(path, i);
                match item {
                    Value::List(pair) if pair.len() == 2 => {
                        out.push((
                            encode_at(key, &pair[0], &p, config)?,
                            encode_at(val, &pair[1], &p, config)?,
                        ));
                    }
                    other => return Err(unexpected(&p, "[key, value] pair", other)),
                }
            }
        }
        Value::Record(entries) => {
            for (name, v) in entries {
                let p = child(path, name);
                out.push((
                    encode_at(key, &Value::text(name.as_str()), &p, config)?,
                    encode_at(val, v, &p, config)?,
                ));
            }
        }
        other => return Err(unexpected(path, schema, other)),
    }
    Ok(Data::Map(out))
}

/// Splits an enum value into its variant name and field source.
///
/// Accepts a [`Value::Variant`], a single-entry record `{Name: fields}`, or
/// bare text naming a fieldless variant.
fn variant_parts<'v>(
    schema: &TypeSchema,
    value: &'v Value,
    path: &str,
) -> Result<(&'v str, FieldSource<'v>), CodecError> {
    match value {
        Value::Variant { name, fields } => Ok((name.as_str(), FieldSource::Named(fields))),
        Value::Text(name) => Ok((name.as_str(), FieldSource::Named(&[]))),
        Value::Record(entries) if entries.len() == 1 => {
            let (name, body) = &entries[0];
            let source = match body {
                Value::Record(fields) => FieldSource::Named(fields),
                Value::List(items) => FieldSource::Positional(items),
                other => return Err(unexpected(&child(path, name), "variant fields", other)),
            };
            Ok((name.as_str(), source))
        }
        other => Err(unexpected(path, schema, other)),
    }
}

/// Encodes declared fields in declaration order.
///
/// Named sources may list fields in any order; an absent field is allowed
/// only when its schema is an option, and encodes as absent.
fn encode_fields(
    fields: &[FieldSchema],
    source: FieldSource<'_>,
    path: &str,
    config: &CodecConfig,
) -> Result<Vec<Data>, CodecError> {
    match source {
        FieldSource::Positional(values) => {
            if values.len() != fields.len() {
                return Err(CodecError::FieldCount {
                    path: path.to_string(),
                    expected: fields.len(),
                    actual: values.len(),
                });
            }
            fields
                .iter()
                .zip(values)
                .map(|(f, v)| encode_at(&f.schema, v, &child(path, &f.name), config))
                .collect()
        }
        FieldSource::Named(entries) => {
            if let Some((unknown, _)) = entries
                .iter()
                .find(|(name, _)| !fields.iter().any(|f| &f.name == name))
            {
                return Err(CodecError::UnknownField {
                    path: path.to_string(),
                    field: unknown.clone(),
                });
            }
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let field_path = child(path, &field.name);
                match entries.iter().find(|(name, _)| name == &field.name) {
                    Some((_, v)) => out.push(encode_at(&field.schema, v, &field_path, config)?),
                    None if matches!(field.schema, TypeSchema::Option { .. }) => {
                        out.push(option::wrap(None));
                    }
                    None => {
                        return Err(CodecError::MissingField {
                            path: path.to_string(),
                            field: field.name.clone(),
                        })
                    }
                }
            }
            Ok(out)
        }
    }
}
