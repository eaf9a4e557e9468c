// JSON interop for dynamic values
//
// Decoding is type-directed: the caller supplies the type the JSON document
// is expected to have. Object attributes missing from the document are left
// absent, since filling them is exactly what a defaults tree is for.

use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Number as JsonNumber, Value as Json};

use crate::internal::error::{Error, Result};
use crate::schema::types::Type;
use crate::value::types::Value;

impl Value {
    /// Decodes a JSON document as a value of type `ty`.
    ///
    /// `Type::Dynamic` infers the type from the document: arrays become
    /// tuples and objects become objects.
    pub fn from_json(json: &Json, ty: &Type) -> Result<Value> {
        match (ty, json) {
            (ty, Json::Null) => Ok(Value::Null(ty.clone())),
            (Type::Dynamic, json) => Ok(infer_from_json(json)),
            (Type::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (Type::Number, Json::Number(n)) => number_from_json(n).map(Value::Number),
            (Type::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (Type::List(element), Json::Array(items)) => {
                Ok(Value::list_of((**element).clone(), decode_items(items, element)?))
            }
            (Type::Set(element), Json::Array(items)) => {
                Ok(Value::set_of((**element).clone(), decode_items(items, element)?))
            }
            (Type::Tuple(types), Json::Array(items)) => {
                if types.len() != items.len() {
                    return Err(Error::JsonError(format!(
                        "Tuple of {} elements required, but document has {}",
                        types.len(),
                        items.len()
                    )));
                }
                let values = items
                    .iter()
                    .zip(types)
                    .map(|(item, ty)| Value::from_json(item, ty))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Tuple(values))
            }
            (Type::Map(element), Json::Object(entries)) => {
                let mut decoded = BTreeMap::new();
                for (key, item) in entries {
                    decoded.insert(key.clone(), Value::from_json(item, element)?);
                }
                Ok(Value::Map {
                    element: (**element).clone(),
                    entries: decoded,
                })
            }
            (Type::Object(object_type), Json::Object(entries)) => {
                let mut decoded = BTreeMap::new();
                for (key, item) in entries {
                    let attr_type = object_type.attribute_type(key).ok_or_else(|| {
                        Error::JsonError(format!("Unsupported attribute {:?}", key))
                    })?;
                    decoded.insert(key.clone(), Value::from_json(item, attr_type)?);
                }
                Ok(Value::Object(decoded))
            }
            (ty, json) => Err(Error::JsonError(format!(
                "{} required, but document has {}",
                ty,
                json_kind(json)
            ))),
        }
    }

    /// Parses a JSON string and decodes it as a value of type `ty`.
    pub fn from_json_str(src: &str, ty: &Type) -> Result<Value> {
        let json: Json = serde_json::from_str(src)?;
        Value::from_json(&json, ty)
    }

    /// Encodes this value as JSON, dropping marks.
    ///
    /// Unknown values have no JSON representation and are rejected.
    pub fn to_json(&self) -> Result<Json> {
        match self {
            Value::Unknown(ty) => Err(Error::JsonError(format!(
                "Cannot encode unknown value of type {}",
                ty
            ))),
            Value::Null(_) => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Number(n) => JsonNumber::from_f64(*n)
                .map(Json::Number)
                .ok_or_else(|| Error::JsonError(format!("Cannot encode non-finite number {}", n))),
            Value::String(s) => Ok(Json::String(s.clone())),
            Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Result<Vec<_>>>()
                .map(Json::Array),
            Value::Map { entries, .. } | Value::Object(entries) => {
                let mut out = JsonMap::new();
                for (key, item) in entries {
                    out.insert(key.clone(), item.to_json()?);
                }
                Ok(Json::Object(out))
            }
            Value::Marked(inner, _) => inner.to_json(),
        }
    }
}

fn decode_items(items: &[Json], element: &Type) -> Result<Vec<Value>> {
    items.iter().map(|item| Value::from_json(item, element)).collect()
}

fn number_from_json(n: &JsonNumber) -> Result<f64> {
    n.as_f64()
        .ok_or_else(|| Error::JsonError(format!("Number {} is not representable", n)))
}

fn infer_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null(Type::Dynamic),
        Json::Bool(b) => Value::Bool(*b),
        // as_f64 only fails for arbitrary-precision numbers, which are not enabled
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Tuple(items.iter().map(infer_from_json).collect()),
        Json::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), infer_from_json(v)))
                .collect(),
        ),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_typed_object_leaves_missing_attributes_absent() {
        let ty = Type::object_with_optional([("a", Type::Number), ("b", Type::String)], ["b"]);
        let v = Value::from_json(&json!({"a": 1}), &ty).unwrap();
        assert_eq!(v, Value::object([("a", Value::from(1.0))]));
    }

    #[test]
    fn test_decode_null_takes_declared_type() {
        let v = Value::from_json(&json!(null), &Type::list(Type::Bool)).unwrap();
        assert_eq!(v, Value::null(Type::list(Type::Bool)));
    }

    #[test]
    fn test_decode_dynamic_infers_tuple_and_object() {
        let v = Value::from_json(&json!([1, "x", {"k": true}]), &Type::Dynamic).unwrap();
        assert_eq!(
            v,
            Value::tuple(vec![
                Value::from(1.0),
                Value::from("x"),
                Value::object([("k", Value::from(true))]),
            ])
        );
    }

    #[test]
    fn test_decode_rejects_unsupported_attribute() {
        let ty = Type::object([("a", Type::Number)]);
        let err = Value::from_json(&json!({"z": 1}), &ty).unwrap_err();
        assert!(err.to_string().contains("Unsupported attribute"));
    }

    #[test]
    fn test_decode_rejects_wrong_kind() {
        let err = Value::from_json(&json!("x"), &Type::Number).unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }

    #[test]
    fn test_decode_tuple_arity() {
        let ty = Type::Tuple(vec![Type::Number, Type::String]);
        assert!(Value::from_json(&json!([1]), &ty).is_err());
        assert!(Value::from_json(&json!([1, "a"]), &ty).is_ok());
    }

    #[test]
    fn test_encode_drops_marks() {
        let v = Value::object([("a", Value::from("s").mark("sensitive"))]);
        assert_eq!(v.to_json().unwrap(), json!({"a": "s"}));
    }

    #[test]
    fn test_encode_unknown_fails() {
        let v = Value::list_of(Type::Number, vec![Value::unknown(Type::Number)]);
        assert!(v.to_json().is_err());
    }

    #[test]
    fn test_from_json_str_reports_parse_errors() {
        let err = Value::from_json_str("{", &Type::Dynamic).unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
