//! Value decoding and coercion
//!
//! Bridges untyped external input and the typed schema:
//! - `decode` reads strings through the literal grammar
//! - `coerce` converts a decoded value into the kind of an existing leaf
//!
//! Coercion is narrow on purpose. Booleans never become numbers or the
//! reverse, and a leaf's kind never changes.

use cfgtree_literal::parse_literal;

use crate::error::CfgError;
use crate::tree::{Array, KeyPath, Value};

/// Decode a raw value.
///
/// Non-strings are returned unchanged. Strings that parse as literals
/// become the literal's value; anything else stays a string.
pub fn decode(raw: Value) -> Value {
    match raw {
        Value::Str(text) => match parse_literal(&text) {
            Ok(literal) => Value::from(literal),
            Err(_) => Value::Str(text),
        },
        other => other,
    }
}

/// Decode `raw` and coerce it against `target`.
///
/// Text bound for a string leaf is kept verbatim, so `"True"` or `"007"`
/// stay exactly as written.
pub fn decode_and_coerce(raw: Value, target: &Value, path: &KeyPath) -> Result<Value, CfgError> {
    match (&raw, target) {
        (Value::Str(_), Value::Str(_)) => Ok(raw),
        _ => coerce(decode(raw), target, path),
    }
}

/// Convert `source` into the kind of `target`, the current value at `path`.
pub fn coerce(source: Value, target: &Value, path: &KeyPath) -> Result<Value, CfgError> {
    match target {
        Value::Node(_) => Err(mismatch(&source, target, path)),

        Value::Array(example) => coerce_array(source, example, target, path),

        Value::Tuple(example) => {
            if !source.is_sequence() {
                return Err(mismatch(&source, target, path));
            }
            let display = source.clone();
            match source.into_items() {
                Ok(items) if items.len() == example.len() => Ok(Value::Tuple(items)),
                _ => Err(mismatch(&display, target, path)),
            }
        }

        _ if source.kind() == target.kind() => Ok(source),

        Value::Str(_) if source.is_scalar() => Ok(Value::Str(scalar_text(&source))),

        Value::List(_) if source.is_sequence() => match source.into_items() {
            Ok(items) => Ok(Value::List(items)),
            Err(other) => Err(mismatch(&other, target, path)),
        },

        Value::Float(_) => match source {
            Value::Int(i) => Ok(Value::Float(i as f64)),
            other => Err(mismatch(&other, target, path)),
        },

        _ => Err(mismatch(&source, target, path)),
    }
}

fn coerce_array(
    source: Value,
    example: &Array,
    target: &Value,
    path: &KeyPath,
) -> Result<Value, CfgError> {
    if let Value::Array(incoming) = &source {
        if incoming.dtype() == example.dtype() && incoming.len() == example.len() {
            return Ok(source);
        }
    }

    let display = source.clone();
    let items = match source.into_items() {
        Ok(items) if items.len() == example.len() => items,
        _ => return Err(mismatch(&display, target, path)),
    };

    Array::from_values(example.dtype(), &items)
        .map(Value::Array)
        .ok_or_else(|| mismatch(&display, target, path))
}

/// Text form of a scalar written into a string leaf.
fn scalar_text(source: &Value) -> String {
    match source {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn mismatch(source: &Value, target: &Value, path: &KeyPath) -> CfgError {
    CfgError::TypeMismatch {
        path: path.to_string(),
        source_type: source.type_name(),
        target_type: target.type_name(),
        source_value: source.to_string(),
        target_value: target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ConfigTree;

    fn path(dotted: &str) -> KeyPath {
        dotted.split('.').collect()
    }

    fn decode_into(raw: &str, target: &Value) -> Result<Value, CfgError> {
        coerce(decode(Value::from(raw)), target, &path("KEY"))
    }

    #[test]
    fn test_decode_leaves_non_strings_alone() {
        assert_eq!(decode(Value::Int(3)), Value::Int(3));
        assert_eq!(decode(Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_decode_literals() {
        assert_eq!(decode(Value::from("100")), Value::Int(100));
        assert_eq!(decode(Value::from("True")), Value::Bool(true));
        assert_eq!(decode(Value::from("None")), Value::Null);
        assert_eq!(decode(Value::from("lbfgs")), Value::from("lbfgs"));
        assert_eq!(
            decode(Value::from("(1, 2)")),
            Value::Tuple(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_int_string_widens_to_float_leaf() {
        assert_eq!(decode_into("100", &Value::Float(1.0)).unwrap(), Value::Float(100.0));
    }

    #[test]
    fn test_list_string_into_float_array() {
        let target = Value::from(Array::from(vec![0.0, 0.0, 0.0]));
        assert_eq!(
            decode_into("[1.2, 2.3, 3.4]", &target).unwrap(),
            Value::from(Array::from(vec![1.2, 2.3, 3.4]))
        );
    }

    #[test]
    fn test_array_length_must_match() {
        let target = Value::from(Array::from(vec![224_i64, 224, 3]));
        let err = decode_into("[256, 256]", &target).unwrap_err();
        assert!(matches!(err, CfgError::TypeMismatch { .. }));
    }

    #[test]
    fn test_array_elements_must_convert() {
        let target = Value::from(Array::from(vec![224_i64, 224, 3]));
        assert!(decode_into("[1.5, 2, 3]", &target).is_err());
        assert!(decode_into("7", &target).is_err());

        let same = Value::from(Array::from(vec![1_i64, 2, 3]));
        assert_eq!(coerce(same.clone(), &target, &path("IMG")).unwrap(), same);
    }

    #[test]
    fn test_bool_string_into_bool_leaf() {
        assert_eq!(decode_into("True", &Value::Bool(false)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_plain_word_into_string_leaf() {
        assert_eq!(
            decode_into("generic", &Value::from("lbfgs")).unwrap(),
            Value::from("generic")
        );
    }

    #[test]
    fn test_numbers_stringify_into_string_leaf() {
        assert_eq!(decode_into("42", &Value::from("x")).unwrap(), Value::from("42"));
        assert_eq!(decode_into("2.0", &Value::from("x")).unwrap(), Value::from("2.0"));
        assert!(decode_into("[1, 2]", &Value::from("x")).is_err());
    }

    #[test]
    fn test_text_into_string_leaf_is_verbatim() {
        let target = Value::from("name");
        for raw in ["True", "None", "007", "1_000", "[1, 2]", " 42 "] {
            assert_eq!(
                decode_and_coerce(Value::from(raw), &target, &path("NAME")).unwrap(),
                Value::from(raw),
                "raw {raw}"
            );
        }
    }

    #[test]
    fn test_typed_scalars_stringify_like_literals() {
        let target = Value::from("name");
        let stringify = |v: Value| decode_and_coerce(v, &target, &path("NAME")).unwrap();
        assert_eq!(stringify(Value::Bool(true)), Value::from("True"));
        assert_eq!(stringify(Value::Bool(false)), Value::from("False"));
        assert_eq!(stringify(Value::Null), Value::from("None"));
        assert_eq!(stringify(Value::Int(7)), Value::from("7"));
    }

    #[test]
    fn test_decode_and_coerce_still_types_other_leaves() {
        let p = path("KEY");
        assert_eq!(
            decode_and_coerce(Value::from("10"), &Value::Float(1.0), &p).unwrap(),
            Value::Float(10.0)
        );
        assert_eq!(
            decode_and_coerce(Value::from("False"), &Value::Bool(true), &p).unwrap(),
            Value::Bool(false)
        );
        assert!(decode_and_coerce(Value::from("007"), &Value::Int(1), &p).is_err());
    }

    #[test]
    fn test_booleans_are_not_numbers() {
        let err = decode_into("9999", &Value::Bool(true)).unwrap_err();
        match err {
            CfgError::TypeMismatch {
                path,
                source_type,
                target_type,
                source_value,
                target_value,
            } => {
                assert_eq!(path, "KEY");
                assert_eq!(source_type, "int");
                assert_eq!(target_type, "bool");
                assert_eq!(source_value, "9999");
                assert_eq!(target_value, "true");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(decode_into("True", &Value::Int(1)).is_err());
        assert!(decode_into("True", &Value::Float(1.0)).is_err());
    }

    #[test]
    fn test_float_does_not_narrow_to_int() {
        assert!(decode_into("1.5", &Value::Int(1)).is_err());
    }

    #[test]
    fn test_sequence_into_tuple_checks_arity() {
        let target = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            decode_into("[3, 4]", &target).unwrap(),
            Value::Tuple(vec![Value::Int(3), Value::Int(4)])
        );
        assert!(decode_into("[3, 4, 5]", &target).is_err());
        assert!(decode_into("3", &target).is_err());
    }

    #[test]
    fn test_sequence_into_list() {
        let target = Value::List(vec![Value::from("a")]);
        assert_eq!(
            decode_into("('b', 'c')", &target).unwrap(),
            Value::List(vec![Value::from("b"), Value::from("c")])
        );
        let array = Value::from(Array::from(vec![1_i64, 2]));
        assert_eq!(
            coerce(array, &target, &path("L")).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_subtree_target_is_never_coerced() {
        let target = Value::Node(ConfigTree::new());
        assert!(decode_into("1", &target).is_err());
    }

    #[test]
    fn test_mismatch_message_names_path() {
        let err = coerce(Value::from("abc"), &Value::Float(1.0), &path("SVM.C")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch (str vs. float) with values (abc vs. 1.0) for key SVM.C"
        );
    }
}
