//! The option convention layered on constructors.
//!
//! A present value is `Constr 0 [x]`; an absent value is `Constr 1 []`.
//! Option schemas, optional struct fields, and optional function arguments
//! all go through [`wrap`] and [`unwrap`].

use plinth_common::{Data, DataKind};

use crate::error::CodecError;

/// Constructor tag of a present option.
pub const SOME_TAG: u64 = 0;

/// Constructor tag of an absent option.
pub const NONE_TAG: u64 = 1;

/// Wraps already-encoded data as an option.
pub fn wrap(inner: Option<Data>) -> Data {
    match inner {
        Some(data) => Data::constr(SOME_TAG, vec![data]),
        None => Data::constr(NONE_TAG, Vec::new()),
    }
}

/// Splits option data into its inner data, failing on any other shape.
pub fn unwrap<'d>(data: &'d Data, path: &str) -> Result<Option<&'d Data>, CodecError> {
    let Data::Constr { tag, fields } = data else {
        return Err(CodecError::KindMismatch {
            path: path.to_string(),
            expected: DataKind::Constr,
            actual: data.kind(),
        });
    };
    let expected = match *tag {
        SOME_TAG => 1,
        NONE_TAG => 0,
        _ => {
            return Err(CodecError::TagOutOfRange {
                path: path.to_string(),
                tag: *tag,
                count: 2,
            })
        }
    };
    if fields.len() != expected {
        return Err(CodecError::FieldCount {
            path: path.to_string(),
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_present_and_absent() {
        assert_eq!(wrap(Some(Data::Int(4))), Data::constr(0, vec![Data::Int(4)]));
        assert_eq!(wrap(None), Data::constr(1, vec![]));
    }

    #[test]
    fn unwrap_inverts_wrap() {
        let some = wrap(Some(Data::Int(4)));
        assert_eq!(unwrap(&some, "$").unwrap(), Some(&Data::Int(4)));
        let none = wrap(None);
        assert_eq!(unwrap(&none, "$").unwrap(), None);
    }

    #[test]
    fn unwrap_rejects_bad_tag() {
        let err = unwrap(&Data::constr(2, vec![]), "$.x").unwrap_err();
        assert_eq!(
            err,
            CodecError::TagOutOfRange {
                path: "$.x".to_string(),
                tag: 2,
                count: 2
            }
        );
    }

    #[test]
    fn unwrap_rejects_extra_fields() {
        let err = unwrap(&Data::constr(1, vec![Data::Int(0)]), "$").unwrap_err();
        assert!(matches!(
            err,
            CodecError::FieldCount {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn unwrap_rejects_non_constr() {
        let err = unwrap(&Data::List(vec![]), "$").unwrap_err();
        assert!(matches!(err, CodecError::KindMismatch { .. }));
    }
}
