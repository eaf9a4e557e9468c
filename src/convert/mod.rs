// Type conversion for tydefaults
//
// This module provides the two type-system primitives the defaults applier
// delegates to:
//
// 1. `convert`, an exact conversion of a value to a declared type
// 2. `unify_safely`, the most specific common type of a set of types

use std::collections::BTreeMap;

use crate::internal::error::{Error, Result};
use crate::schema::types::{ObjectType, Type};
use crate::value::Value;

pub use self::mismatch::mismatch_message;
pub use self::unify::{unify_safely, Conversion};

pub mod mismatch;
pub mod unify;

/// Converts `value` to exactly `want`.
///
/// Marks on `value` are preserved. Null and unknown values convert to a null
/// or unknown of the target type. Nested marks ride along with the elements
/// they are attached to.
pub fn convert(value: Value, want: &Type) -> Result<Value> {
    let (value, marks) = value.unmark();
    convert_unmarked(value, want).map(|converted| converted.with_marks(marks))
}

fn convert_unmarked(value: Value, want: &Type) -> Result<Value> {
    if *want == Type::Dynamic {
        return Ok(value);
    }
    match value {
        Value::Unknown(_) => return Ok(Value::Unknown(want.clone())),
        Value::Null(_) => return Ok(Value::Null(want.clone())),
        _ => {}
    }
    if value.ty() == *want {
        return Ok(value);
    }

    match (value, want) {
        (Value::Bool(b), Type::String) => Ok(Value::String(b.to_string())),
        (Value::Number(n), Type::String) => Ok(Value::String(n.to_string())),
        (Value::String(s), Type::Bool) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::ConversionError(format!(
                "a bool is required, but have string {:?}",
                s
            ))),
        },
        (Value::String(s), Type::Number) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(Error::ConversionError(format!(
                "a number is required, but have string {:?}",
                s
            ))),
        },
        (
            Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items),
            Type::List(element),
        ) => {
            let (element, items) = convert_elements(items, element)?;
            Ok(Value::list_of(element, items))
        }
        (
            Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items),
            Type::Set(element),
        ) => {
            let (element, items) = convert_elements(items, element)?;
            Ok(Value::set_of(element, items))
        }
        (
            Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items),
            Type::Tuple(types),
        ) => {
            if items.len() != types.len() {
                return Err(Error::ConversionError(format!(
                    "a tuple of {} elements is required, but have {}",
                    types.len(),
                    items.len()
                )));
            }
            let items = items
                .into_iter()
                .zip(types)
                .enumerate()
                .map(|(ix, (item, ty))| {
                    convert(item, ty).map_err(|err| in_context(&format!("element {}", ix), err))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Tuple(items))
        }
        (Value::Map { entries, .. } | Value::Object(entries), Type::Map(element)) => {
            let (keys, items): (Vec<String>, Vec<Value>) = entries.into_iter().unzip();
            let (element, items) = convert_elements(items, element)?;
            Ok(Value::map_of(element, keys.into_iter().zip(items)))
        }
        (Value::Map { entries, .. } | Value::Object(entries), Type::Object(object_type)) => {
            convert_attributes(entries, object_type).map(Value::Object)
        }
        (value, want) => Err(Error::ConversionError(format!(
            "{} required, but have {}",
            want,
            value.ty()
        ))),
    }
}

/// Converts every element to `element`, resolving a `Dynamic` element type
/// to the unified type of the elements first.
fn convert_elements(items: Vec<Value>, element: &Type) -> Result<(Type, Vec<Value>)> {
    let element = if *element == Type::Dynamic && !items.is_empty() {
        let types: Vec<Type> = items.iter().map(Value::ty).collect();
        match unify_safely(&types).0 {
            Some(unified) => unified,
            None => {
                return Err(Error::ConversionError(
                    "all elements must have the same type".to_string(),
                ))
            }
        }
    } else {
        element.clone()
    };

    let items = items
        .into_iter()
        .enumerate()
        .map(|(ix, item)| {
            convert(item, &element).map_err(|err| in_context(&format!("element {}", ix), err))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((element, items))
}

fn convert_attributes(
    mut entries: BTreeMap<String, Value>,
    object_type: &ObjectType,
) -> Result<BTreeMap<String, Value>> {
    if let Some(extra) = entries
        .keys()
        .find(|key| !object_type.attributes.contains_key(*key))
    {
        return Err(Error::ConversionError(format!(
            "unsupported attribute {:?}",
            extra
        )));
    }

    let mut converted = BTreeMap::new();
    for (name, attr_type) in &object_type.attributes {
        let value = match entries.remove(name) {
            Some(value) => convert(value, attr_type)
                .map_err(|err| in_context(&format!("attribute {:?}", name), err))?,
            None if object_type.is_optional(name) => Value::Null(attr_type.clone()),
            None => {
                return Err(Error::ConversionError(format!(
                    "attribute {:?} is required",
                    name
                )))
            }
        };
        converted.insert(name.clone(), value);
    }
    Ok(converted)
}

fn in_context(path: &str, err: Error) -> Error {
    match err {
        Error::ConversionError(msg) => Error::ConversionError(format!("{}: {}", path, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_and_dynamic() {
        let v = Value::from(1.0);
        assert_eq!(convert(v.clone(), &Type::Number).unwrap(), v);
        assert_eq!(convert(v.clone(), &Type::Dynamic).unwrap(), v);
    }

    #[test]
    fn test_null_and_unknown_retyped() {
        let v = convert(Value::null(Type::Dynamic), &Type::String).unwrap();
        assert_eq!(v, Value::null(Type::String));
        let v = convert(Value::unknown(Type::Number), &Type::String).unwrap();
        assert_eq!(v, Value::unknown(Type::String));
    }

    #[test]
    fn test_primitive_conversions() {
        assert_eq!(convert(Value::from(2.5), &Type::String).unwrap(), Value::from("2.5"));
        assert_eq!(convert(Value::from(true), &Type::String).unwrap(), Value::from("true"));
        assert_eq!(convert(Value::from("12"), &Type::Number).unwrap(), Value::from(12.0));
        assert_eq!(convert(Value::from("false"), &Type::Bool).unwrap(), Value::from(false));
    }

    #[test]
    fn test_non_numeric_string_fails() {
        let err = convert(Value::from("hello"), &Type::Number).unwrap_err();
        assert!(matches!(err, Error::ConversionError(_)));
        assert!(convert(Value::from("NaN"), &Type::Number).is_err());
        assert!(convert(Value::from(1.0), &Type::Bool).is_err());
    }

    #[test]
    fn test_tuple_to_list_and_set() {
        let t = Value::tuple(vec![Value::from(1.0), Value::from("2"), Value::from(1.0)]);
        let list = convert(t.clone(), &Type::list(Type::Number)).unwrap();
        assert_eq!(
            list,
            Value::list_of(
                Type::Number,
                vec![Value::from(1.0), Value::from(2.0), Value::from(1.0)]
            )
        );
        let set = convert(t, &Type::set(Type::Number)).unwrap();
        assert_eq!(set.as_value_slice().unwrap().len(), 2);
    }

    #[test]
    fn test_dynamic_element_type_unifies() {
        let t = Value::tuple(vec![Value::from("a"), Value::from("b")]);
        let list = convert(t, &Type::list(Type::Dynamic)).unwrap();
        assert_eq!(list.ty(), Type::list(Type::String));

        let mixed = Value::tuple(vec![Value::from("a"), Value::from(1.0)]);
        assert!(convert(mixed, &Type::list(Type::Dynamic)).is_err());
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let t = Value::tuple(vec![Value::from(1.0)]);
        assert!(convert(t, &Type::Tuple(vec![Type::Number, Type::Number])).is_err());
    }

    #[test]
    fn test_object_to_object_fills_optional_nulls() {
        let ty = Type::object_with_optional([("a", Type::Number), ("b", Type::String)], ["b"]);
        let v = convert(Value::object([("a", Value::from("3"))]), &ty).unwrap();
        assert_eq!(
            v,
            Value::object([("a", Value::from(3.0)), ("b", Value::null(Type::String))])
        );
    }

    #[test]
    fn test_object_missing_required_attribute() {
        let ty = Type::object([("a", Type::Number)]);
        let err = convert(Value::object([("b", Value::from(1.0))]), &ty).unwrap_err();
        assert!(err.to_string().contains("unsupported attribute \"b\""));

        let err = convert(Value::object(Vec::<(String, Value)>::new()), &ty).unwrap_err();
        assert!(err.to_string().contains("attribute \"a\" is required"));
    }

    #[test]
    fn test_object_to_map() {
        let v = Value::object([("x", Value::from(1.0)), ("y", Value::from(2.0))]);
        let m = convert(v, &Type::map(Type::String)).unwrap();
        assert_eq!(
            m,
            Value::map_of(Type::String, [("x", Value::from("1")), ("y", Value::from("2"))])
        );
    }

    #[test]
    fn test_nested_error_has_path() {
        let ty = Type::object([("a", Type::list(Type::Number))]);
        let v = Value::object([("a", Value::tuple(vec![Value::from(1.0), Value::from("x")]))]);
        let err = convert(v, &ty).unwrap_err();
        assert!(err.to_string().contains("attribute \"a\": element 1"));
    }

    #[test]
    fn test_marks_preserved() {
        let v = Value::from(1.0).mark("sensitive");
        let converted = convert(v, &Type::String).unwrap();
        assert_eq!(converted, Value::from("1").mark("sensitive"));
    }

    #[test]
    fn test_scalar_to_collection_fails() {
        assert!(convert(Value::from(1.0), &Type::list(Type::Number)).is_err());
    }
}
