//! Errors raised while encoding or decoding.

use plinth_common::DataKind;

/// A value or data tree does not fit its schema.
///
/// Every variant carries the path of the offending node, rooted at `$`
/// (for example `$.owner` or `$.outputs[2]`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The data node has the wrong kind.
    #[error("{path}: expected {expected}, got {actual}")]
    KindMismatch {
        /// Location of the node.
        path: String,
        /// Kind required by the schema.
        expected: DataKind,
        /// Kind found in the data.
        actual: DataKind,
    },

    /// A constructor tag is outside the declared variant range.
    #[error("{path}: constructor tag {tag} out of range, expected a tag below {count}")]
    TagOutOfRange {
        /// Location of the node.
        path: String,
        /// Tag found in the data.
        tag: u64,
        /// Number of declared variants.
        count: usize,
    },

    /// A struct, tuple, or variant has the wrong number of fields.
    #[error("{path}: expected {expected} fields, got {actual}")]
    FieldCount {
        /// Location of the node.
        path: String,
        /// Declared field count.
        expected: usize,
        /// Field count found.
        actual: usize,
    },

    /// A hash-like byte string has the wrong length.
    #[error("{path}: {primitive} must be {expected} bytes, got {actual}")]
    ByteLength {
        /// Location of the node.
        path: String,
        /// The primitive being converted.
        primitive: &'static str,
        /// Required length.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// Bytes declared as `String` are not valid UTF-8.
    #[error("{path}: string bytes are not valid UTF-8")]
    InvalidUtf8 {
        /// Location of the node.
        path: String,
    },

    /// Data of the right shape carries an illegal value.
    #[error("{path}: invalid data: {reason}")]
    InvalidData {
        /// Location of the node.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The host value has no accepted representation for the schema.
    #[error("{path}: cannot encode {actual} as {expected}")]
    UnexpectedValue {
        /// Location of the value.
        path: String,
        /// The schema, rendered.
        expected: String,
        /// Kind of the supplied value.
        actual: &'static str,
    },

    /// The host value is of an accepted kind but malformed.
    #[error("{path}: invalid value: {reason}")]
    InvalidValue {
        /// Location of the value.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A required struct or variant field was not supplied.
    #[error("{path}: missing field '{field}'")]
    MissingField {
        /// Location of the record.
        path: String,
        /// The missing field.
        field: String,
    },

    /// A record supplies a field the schema does not declare.
    #[error("{path}: unknown field '{field}'")]
    UnknownField {
        /// Location of the record.
        path: String,
        /// The undeclared field.
        field: String,
    },

    /// An enum value names a variant the schema does not declare.
    #[error("{path}: unknown variant '{name}'")]
    UnknownVariant {
        /// Location of the value.
        path: String,
        /// The undeclared variant.
        name: String,
    },

    /// An address belongs to the other network.
    #[error("{path}: address network mismatch, expected {}", network_name(.expected_mainnet))]
    NetworkMismatch {
        /// Location of the value.
        path: String,
        /// Network required by the codec configuration.
        expected_mainnet: bool,
    },
}

fn network_name(mainnet: &bool) -> &'static str {
    if *mainnet {
        "mainnet"
    } else {
        "testnet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_display() {
        let err = CodecError::KindMismatch {
            path: "$.datum".to_string(),
            expected: DataKind::Constr,
            actual: DataKind::List,
        };
        assert_eq!(err.to_string(), "$.datum: expected constructor, got list");
    }

    #[test]
    fn tag_out_of_range_display() {
        let err = CodecError::TagOutOfRange {
            path: "$".to_string(),
            tag: 2,
            count: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("tag 2"));
        assert!(msg.contains("below 2"));
    }

    #[test]
    fn field_count_display() {
        let err = CodecError::FieldCount {
            path: "$.pair".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "$.pair: expected 2 fields, got 3");
    }

    #[test]
    fn network_mismatch_display() {
        let err = CodecError::NetworkMismatch {
            path: "$".to_string(),
            expected_mainnet: true,
        };
        assert!(err.to_string().ends_with("expected mainnet"));
    }
}
