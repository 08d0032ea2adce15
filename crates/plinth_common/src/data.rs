//! The canonical data tree consumed and produced by on-chain programs.
//!
//! [`Data`] has exactly five node kinds. Every `TypeSchema` shape maps onto
//! one of them; the mapping itself lives in `plinth_codec`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the canonical, self-describing data tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Data {
    /// A signed integer.
    Int(i128),
    /// A bounded byte string.
    Bytes(Vec<u8>),
    /// An ordered list.
    List(Vec<Data>),
    /// An ordered association list. Keys are not deduplicated or sorted.
    Map(Vec<(Data, Data)>),
    /// A constructor: a small tag plus ordered fields.
    Constr {
        /// Constructor index.
        tag: u64,
        /// Constructor fields in order.
        fields: Vec<Data>,
    },
}

/// The node kind of a [`Data`] value, used in mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// [`Data::Int`].
    Int,
    /// [`Data::Bytes`].
    Bytes,
    /// [`Data::List`].
    List,
    /// [`Data::Map`].
    Map,
    /// [`Data::Constr`].
    Constr,
}

impl Data {
    /// Builds a constructor node.
    pub fn constr(tag: u64, fields: Vec<Data>) -> Self {
        Self::Constr { tag, fields }
    }

    /// Returns the node kind.
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Int(_) => DataKind::Int,
            Self::Bytes(_) => DataKind::Bytes,
            Self::List(_) => DataKind::List,
            Self::Map(_) => DataKind::Map,
            Self::Constr { .. } => DataKind::Constr,
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "integer",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Constr => "constructor",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Bytes(b) => write!(f, "#{}", hex::encode(b)),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Constr { tag, fields } => {
                write!(f, "{tag}{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_each_node() {
        assert_eq!(Data::Int(1).kind(), DataKind::Int);
        assert_eq!(Data::Bytes(vec![]).kind(), DataKind::Bytes);
        assert_eq!(Data::List(vec![]).kind(), DataKind::List);
        assert_eq!(Data::Map(vec![]).kind(), DataKind::Map);
        assert_eq!(Data::constr(0, vec![]).kind(), DataKind::Constr);
    }

    #[test]
    fn display_nested() {
        let d = Data::constr(
            1,
            vec![
                Data::Int(-7),
                Data::Bytes(vec![0xab, 0x01]),
                Data::List(vec![Data::Int(1), Data::Int(2)]),
                Data::Map(vec![(Data::Bytes(vec![]), Data::Int(0))]),
            ],
        );
        assert_eq!(d.to_string(), "1{-7, #ab01, [1, 2], {#: 0}}");
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(DataKind::Constr.to_string(), "constructor");
        assert_eq!(DataKind::Bytes.to_string(), "bytes");
    }

    #[test]
    fn serde_roundtrip() {
        let d = Data::constr(0, vec![Data::Int(42), Data::Bytes(vec![1, 2, 3])]);
        let json = serde_json::to_string(&d).unwrap();
        let back: Data = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
