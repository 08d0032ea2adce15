//! Host-side values.

use plinth_common::Data;

use crate::address::Address;
use crate::real::Real;

/// A host value converted to or from canonical data.
///
/// Encoding accepts several representations per schema (hex text for
/// hashes, records or positional lists for structs, and so on). Decoding
/// always produces one canonical representation:
///
/// | schema | decoded as |
/// |---|---|
/// | `Bool` | [`Value::Bool`] |
/// | `Int`, `Time`, `Duration` | [`Value::Int`] |
/// | `Real` | [`Value::Real`] |
/// | `String` | [`Value::Text`] |
/// | `ByteArray`, hashes, `TxId` | [`Value::Bytes`] |
/// | `Data` | [`Value::Data`] |
/// | `Address` | [`Value::Address`] |
/// | list, tuple | [`Value::List`] |
/// | map, `Value` | [`Value::Map`] |
/// | option | [`Value::Option`] |
/// | struct, `TxOutputId`, `AssetClass`, `Ratio` | [`Value::Record`] |
/// | enum, credentials | [`Value::Variant`] |
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i128),
    /// A fixed-point decimal.
    Real(Real),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Text.
    Text(String),
    /// A sequence.
    List(Vec<Value>),
    /// Key/value pairs in order.
    Map(Vec<(Value, Value)>),
    /// A possibly absent value.
    Option(Option<Box<Value>>),
    /// Named fields in declaration order.
    Record(Vec<(String, Value)>),
    /// An enum variant with its named fields.
    Variant {
        /// Variant name.
        name: String,
        /// Fields in declaration order.
        fields: Vec<(String, Value)>,
    },
    /// A structured address.
    Address(Address),
    /// Already-encoded data, passed through as is.
    Data(Data),
}

impl Value {
    /// Builds a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Builds a present option.
    pub fn some(value: Value) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    /// Builds an absent option.
    pub fn none() -> Self {
        Self::Option(None)
    }

    /// Builds a record from `(name, value)` pairs.
    pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Builds an enum variant from its name and `(name, value)` fields.
    pub fn variant<N: Into<String>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (N, Value)>,
    ) -> Self {
        Self::Variant {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Returns a short name of this value's kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Option(_) => "option",
            Self::Record(_) => "record",
            Self::Variant { .. } => "variant",
            Self::Address(_) => "address",
            Self::Data(_) => "data",
        }
    }

    /// Looks up a field of a record or variant by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let fields = match self {
            Self::Record(fields) | Self::Variant { fields, .. } => fields,
            _ => return None,
        };
        fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<Real> for Value {
    fn from(r: Real) -> Self {
        Self::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Data> for Value {
    fn from(data: Data) -> Self {
        Self::Data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_field_lookup() {
        let v = Value::record([("a", Value::Int(1)), ("b", Value::text("x"))]);
        assert_eq!(v.field("b"), Some(&Value::text("x")));
        assert_eq!(v.field("c"), None);
    }

    #[test]
    fn variant_field_lookup() {
        let v = Value::variant("Bar", [("data", Value::Int(0))]);
        assert_eq!(v.field("data"), Some(&Value::Int(0)));
        assert_eq!(Value::Int(3).field("data"), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(5i64), Value::Int(5));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
        assert_eq!(Value::from(vec![1u8]), Value::Bytes(vec![1]));
        assert_eq!(
            Value::from(Real::from_scaled(5)),
            Value::Real(Real::from_scaled(5))
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::none().kind_name(), "option");
        assert_eq!(Value::Data(Data::Int(0)).kind_name(), "data");
    }
}
