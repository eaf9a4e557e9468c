// Mismatch descriptions
//
// Reduces a type mismatch to a single short sentence naming the first
// incompatibility found. Callers are expected to add their own context.

use crate::schema::types::{ObjectType, Type};

/// Describes why a value of type `got` does not conform to `want`.
pub fn mismatch_message(got: &Type, want: &Type) -> String {
    match (got, want) {
        (Type::Object(got_obj), Type::Object(want_obj)) => object_mismatch(got_obj, want_obj)
            .unwrap_or_else(|| "incorrect object attributes".to_string()),
        (Type::Map(got_elem), Type::Object(want_obj)) => want_obj
            .attributes
            .iter()
            .find(|(_, attr_type)| !always_converts(got_elem, attr_type))
            .map(|(name, attr_type)| {
                format!("attribute {:?}: {}", name, mismatch_message(got_elem, attr_type))
            })
            .unwrap_or_else(|| "map keys do not match the required attributes".to_string()),
        (Type::Tuple(got_types), Type::Tuple(want_types)) if got_types.len() != want_types.len() => {
            format!(
                "tuple required with {} elements, but have {}",
                want_types.len(),
                got_types.len()
            )
        }
        (Type::Tuple(got_types), Type::Tuple(want_types)) => got_types
            .iter()
            .zip(want_types)
            .enumerate()
            .find(|(_, (g, w))| !always_converts(g, w))
            .map(|(ix, (g, w))| format!("element {}: {}", ix, mismatch_message(g, w)))
            .unwrap_or_else(|| "incorrect tuple elements".to_string()),
        (
            Type::Tuple(got_types),
            Type::List(want_elem) | Type::Set(want_elem),
        ) => got_types
            .iter()
            .enumerate()
            .find(|(_, g)| !always_converts(g, want_elem))
            .map(|(ix, g)| format!("element {}: {}", ix, mismatch_message(g, want_elem)))
            .unwrap_or_else(|| format!("{} required, but have {}", want, got)),
        (
            Type::List(got_elem) | Type::Set(got_elem) | Type::Map(got_elem),
            Type::List(want_elem) | Type::Set(want_elem) | Type::Map(want_elem),
        ) if got.shape() == want.shape() => {
            format!("element: {}", mismatch_message(got_elem, want_elem))
        }
        _ => format!("{} required, but have {}", want, got),
    }
}

fn object_mismatch(got: &ObjectType, want: &ObjectType) -> Option<String> {
    for (name, want_type) in &want.attributes {
        match got.attributes.get(name) {
            None if !want.is_optional(name) => {
                return Some(format!("attribute {:?} is required", name));
            }
            Some(got_type) if !always_converts(got_type, want_type) => {
                return Some(format!(
                    "attribute {:?}: {}",
                    name,
                    mismatch_message(got_type, want_type)
                ));
            }
            _ => {}
        }
    }
    got.attributes
        .keys()
        .find(|name| !want.attributes.contains_key(*name))
        .map(|name| format!("unsupported attribute {:?}", name))
}

/// Type-level check: true when every value of `got` converts to `want`.
fn always_converts(got: &Type, want: &Type) -> bool {
    got == want
        || *want == Type::Dynamic
        || *got == Type::Dynamic
        || (*want == Type::String && got.is_primitive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_mismatch() {
        assert_eq!(
            mismatch_message(&Type::String, &Type::Number),
            "number required, but have string"
        );
    }

    #[test]
    fn test_object_attribute_mismatch() {
        let got = Type::object([("a", Type::String)]);
        let want = Type::object([("a", Type::Number)]);
        assert_eq!(
            mismatch_message(&got, &want),
            "attribute \"a\": number required, but have string"
        );
    }

    #[test]
    fn test_object_missing_and_unsupported() {
        let want = Type::object([("a", Type::Number)]);
        let got = Type::object([("b", Type::Number)]);
        assert_eq!(mismatch_message(&got, &want), "attribute \"a\" is required");

        let want = Type::object_with_optional([("a", Type::Number)], ["a"]);
        assert_eq!(mismatch_message(&got, &want), "unsupported attribute \"b\"");
    }

    #[test]
    fn test_tuple_into_list_names_element() {
        let got = Type::Tuple(vec![Type::Number, Type::list(Type::Bool)]);
        let want = Type::list(Type::Number);
        assert_eq!(
            mismatch_message(&got, &want),
            "element 1: number required, but have list of bool"
        );
    }

    #[test]
    fn test_collection_element_mismatch() {
        let got = Type::list(Type::Bool);
        let want = Type::list(Type::Number);
        assert_eq!(
            mismatch_message(&got, &want),
            "element: number required, but have bool"
        );
    }
}
