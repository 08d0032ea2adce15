//! The recursive type description.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitive::Primitive;

/// The shape of a value exchanged with an on-chain program.
///
/// Field and variant order is significant: it is the wire order. Names are
/// only used to address fields in host values, never on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSchema {
    /// A primitive with a fixed encoding rule.
    Primitive {
        /// Which primitive.
        primitive: Primitive,
    },
    /// A homogeneous list.
    List {
        /// Element type.
        item: Box<TypeSchema>,
    },
    /// An association list.
    Map {
        /// Key type.
        key: Box<TypeSchema>,
        /// Value type.
        value: Box<TypeSchema>,
    },
    /// A value that may be absent.
    Option {
        /// Type of the present value.
        some: Box<TypeSchema>,
    },
    /// A fixed-size heterogeneous sequence, encoded as a list.
    Tuple {
        /// Element types in order.
        items: Vec<TypeSchema>,
    },
    /// A record with ordered named fields.
    Struct {
        /// Fields in declaration order.
        fields: Vec<FieldSchema>,
    },
    /// A tagged union.
    Enum {
        /// Variants in declaration order.
        variants: Vec<VariantSchema>,
    },
}

/// A named field of a struct or enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub schema: TypeSchema,
}

/// A variant of an enum schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSchema {
    /// Variant name.
    pub name: String,
    /// Constructor tag; always equal to the variant's declaration index.
    pub tag: u64,
    /// Variant fields in order.
    pub fields: Vec<FieldSchema>,
}

/// A structural problem found by [`TypeSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields of the same struct or variant share a name.
    #[error("duplicate field '{name}'")]
    DuplicateField {
        /// The repeated name.
        name: String,
    },

    /// Two variants of the same enum share a name.
    #[error("duplicate variant '{name}'")]
    DuplicateVariant {
        /// The repeated name.
        name: String,
    },

    /// A variant's tag does not match its position.
    #[error("variant '{variant}' has tag {actual}, expected {expected}")]
    TagMismatch {
        /// The offending variant.
        variant: String,
        /// Its declaration index.
        expected: u64,
        /// The tag it carries.
        actual: u64,
    },
}

fn fields_from<N: Into<String>>(fields: impl IntoIterator<Item = (N, TypeSchema)>) -> Vec<FieldSchema> {
    fields
        .into_iter()
        .map(|(name, schema)| FieldSchema {
            name: name.into(),
            schema,
        })
        .collect()
}

impl TypeSchema {
    /// A primitive schema.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::Primitive { primitive }
    }

    /// A list schema.
    pub fn list(item: TypeSchema) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    /// A map schema.
    pub fn map(key: TypeSchema, value: TypeSchema) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// An option schema.
    pub fn option(some: TypeSchema) -> Self {
        Self::Option {
            some: Box::new(some),
        }
    }

    /// A tuple schema.
    pub fn tuple(items: Vec<TypeSchema>) -> Self {
        Self::Tuple { items }
    }

    /// A struct schema from `(name, type)` pairs in wire order.
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, TypeSchema)>) -> Self {
        Self::Struct {
            fields: fields_from(fields),
        }
    }

    /// An enum schema from `(variant name, fields)` pairs. Tags are assigned
    /// from declaration order.
    pub fn enumeration<V, N>(variants: impl IntoIterator<Item = (V, Vec<(N, TypeSchema)>)>) -> Self
    where
        V: Into<String>,
        N: Into<String>,
    {
        let variants = variants
            .into_iter()
            .enumerate()
            .map(|(i, (name, fields))| VariantSchema {
                name: name.into(),
                tag: i as u64,
                fields: fields_from(fields),
            })
            .collect();
        Self::Enum { variants }
    }

    /// Checks tag order and name uniqueness throughout the schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            Self::Primitive { .. } => Ok(()),
            Self::List { item } => item.validate(),
            Self::Map { key, value } => {
                key.validate()?;
                value.validate()
            }
            Self::Option { some } => some.validate(),
            Self::Tuple { items } => items.iter().try_for_each(TypeSchema::validate),
            Self::Struct { fields } => validate_fields(fields),
            Self::Enum { variants } => {
                let mut seen = HashSet::new();
                for (i, variant) in variants.iter().enumerate() {
                    if !seen.insert(variant.name.as_str()) {
                        return Err(SchemaError::DuplicateVariant {
                            name: variant.name.clone(),
                        });
                    }
                    if variant.tag != i as u64 {
                        return Err(SchemaError::TagMismatch {
                            variant: variant.name.clone(),
                            expected: i as u64,
                            actual: variant.tag,
                        });
                    }
                    validate_fields(&variant.fields)?;
                }
                Ok(())
            }
        }
    }
}

fn validate_fields(fields: &[FieldSchema]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                name: field.name.clone(),
            });
        }
        field.schema.validate()?;
    }
    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[FieldSchema]) -> fmt::Result {
    f.write_str("{")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", field.name, field.schema)?;
    }
    f.write_str("}")
}

impl fmt::Display for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { primitive } => write!(f, "{primitive}"),
            Self::List { item } => write!(f, "[]{item}"),
            Self::Map { key, value } => write!(f, "Map[{key}]{value}"),
            Self::Option { some } => write!(f, "Option[{some}]"),
            Self::Tuple { items } => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Struct { fields } => write_fields(f, fields),
            Self::Enum { variants } => {
                f.write_str("enum {")?;
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&variant.name)?;
                    if !variant.fields.is_empty() {
                        write_fields(f, &variant.fields)?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeSchema {
        TypeSchema::primitive(Primitive::Int)
    }

    #[test]
    fn enumeration_assigns_tags_in_order() {
        let schema = TypeSchema::enumeration([
            ("Foo", Vec::<(&str, TypeSchema)>::new()),
            ("Bar", vec![("x", int())]),
        ]);
        match &schema {
            TypeSchema::Enum { variants } => {
                assert_eq!(variants[0].tag, 0);
                assert_eq!(variants[1].tag, 1);
                assert_eq!(variants[1].fields[0].name, "x");
            }
            other => panic!("expected enum, got {other}"),
        }
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_field() {
        let schema = TypeSchema::structure([("a", int()), ("a", int())]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DuplicateField {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn validate_rejects_bad_tag() {
        let schema = TypeSchema::Enum {
            variants: vec![VariantSchema {
                name: "Only".to_string(),
                tag: 3,
                fields: vec![],
            }],
        };
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("tag 3, expected 0"));
    }

    #[test]
    fn validate_recurses_into_collections() {
        let bad = TypeSchema::structure([("x", int()), ("x", int())]);
        let schema = TypeSchema::list(TypeSchema::option(bad));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn display_forms() {
        let schema = TypeSchema::structure([
            ("owner", TypeSchema::primitive(Primitive::PubKeyHash)),
            (
                "amounts",
                TypeSchema::map(TypeSchema::primitive(Primitive::String), TypeSchema::list(int())),
            ),
            ("deadline", TypeSchema::option(TypeSchema::primitive(Primitive::Time))),
        ]);
        assert_eq!(
            schema.to_string(),
            "{owner: PubKeyHash, amounts: Map[String][]Int, deadline: Option[Time]}"
        );
    }

    #[test]
    fn serde_roundtrip_is_tagged() {
        let schema = TypeSchema::enumeration([
            ("Foo", Vec::<(&str, TypeSchema)>::new()),
            ("Bar", vec![("data", TypeSchema::map(int(), int()))]),
        ]);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"kind\":\"enum\""));
        let back: TypeSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, back);
    }

    #[test]
    fn deserialize_from_handwritten_json() {
        let json = r#"{"kind": "option", "some": {"kind": "primitive", "primitive": "int"}}"#;
        let schema: TypeSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema, TypeSchema::option(int()));
    }
}
