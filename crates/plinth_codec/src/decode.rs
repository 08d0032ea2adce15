//! Strict decoding of canonical data into host values.

use plinth_common::Data;
use plinth_schema::TypeSchema;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::option;
use crate::primitive::decode_primitive;
use crate::shape::{child, data_constr, data_list, data_list_of, data_map, index};
use crate::value::Value;
use crate::ROOT;

/// Decodes `data` into a host value shaped by `schema`.
///
/// Fails, naming the expected and actual shape, when a node has the wrong
/// kind, an enum tag is out of range, or a field count differs from the
/// schema. Nothing is coerced.
pub fn decode(schema: &TypeSchema, data: &Data, config: &CodecConfig) -> Result<Value, CodecError> {
    decode_at(schema, data, ROOT, config)
}

pub(crate) fn decode_at(
    schema: &TypeSchema,
    data: &Data,
    path: &str,
    config: &CodecConfig,
) -> Result<Value, CodecError> {
    match schema {
        TypeSchema::Primitive { primitive } => decode_primitive(*primitive, data, path, config),
        TypeSchema::List { item } => data_list(data, path)?
            .iter()
            .enumerate()
            .map(|(i, d)| decode_at(item, d, &index(path, i), config))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        TypeSchema::Map { key, value } => data_map(data, path)?
            .iter()
            .enumerate()
            .map(|(i, (k, v))| {
                let p = index(path, i);
                Ok((decode_at(key, k, &p, config)?, decode_at(value, v, &p, config)?))
            })
            .collect::<Result<Vec<_>, CodecError>>()
            .map(Value::Map),
        TypeSchema::Option { some } => match option::unwrap(data, path)? {
            Some(inner) => Ok(Value::some(decode_at(some, inner, path, config)?)),
            None => Ok(Value::none()),
        },
        TypeSchema::Tuple { items } => data_list_of(data, path, items.len())?
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (d, s))| decode_at(s, d, &index(path, i), config))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        TypeSchema::Struct { fields } => {
            if let [only] = fields.as_slice() {
                let v = decode_at(&only.schema, data, &child(path, &only.name), config)?;
                return Ok(Value::Record(vec![(only.name.clone(), v)]));
            }
            let items = data_list_of(data, path, fields.len())?;
            fields
                .iter()
                .zip(items)
                .map(|(f, d)| {
                    let v = decode_at(&f.schema, d, &child(path, &f.name), config)?;
                    Ok((f.name.clone(), v))
                })
                .collect::<Result<Vec<_>, CodecError>>()
                .map(Value::Record)
        }
        TypeSchema::Enum { variants } => {
            let arities: Vec<usize> = variants.iter().map(|v| v.fields.len()).collect();
            let (tag, items) = data_constr(data, path, &arities)?;
            let variant = &variants[tag as usize];
            let variant_path = child(path, &variant.name);
            let fields = variant
                .fields
                .iter()
                .zip(items)
                .map(|(f, d)| {
                    let v = decode_at(&f.schema, d, &child(&variant_path, &f.name), config)?;
                    Ok((f.name.clone(), v))
                })
                .collect::<Result<Vec<_>, CodecError>>()?;
            Ok(Value::Variant {
                name: variant.name.clone(),
                fields,
            })
        }
    }
}
