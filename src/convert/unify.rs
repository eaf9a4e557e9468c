// Safe type unification
//
// Finds the most specific type that every input type can be converted to
// without loss. Primitives never unify with each other: a string and a
// number have no common safe type, and the caller keeps them heterogeneous.

use std::collections::BTreeSet;

use crate::internal::error::Result;
use crate::schema::types::{ObjectType, Type};
use crate::value::Value;

use super::convert;

/// A conversion to a unified type that `unify_safely` has proven safe.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    target: Type,
}

impl Conversion {
    pub(crate) fn new(target: Type) -> Self {
        Self { target }
    }

    /// Returns the type this conversion produces
    pub fn target(&self) -> &Type {
        &self.target
    }

    /// Converts `value` to the unified type
    pub fn apply(&self, value: Value) -> Result<Value> {
        convert(value, &self.target)
    }
}

/// Unifies `types`, returning the common type (if any) and, per input, the
/// conversion needed to reach it (`None` when the input already has it).
pub fn unify_safely(types: &[Type]) -> (Option<Type>, Vec<Option<Conversion>>) {
    match unified_type(types) {
        None => (None, vec![None; types.len()]),
        Some(unified) => {
            let conversions = types
                .iter()
                .map(|ty| {
                    if *ty == unified || unified == Type::Dynamic {
                        None
                    } else {
                        Some(Conversion::new(unified.clone()))
                    }
                })
                .collect();
            (Some(unified), conversions)
        }
    }
}

fn unified_type(types: &[Type]) -> Option<Type> {
    let first = types.first()?;
    if types.iter().all(|ty| ty == first) {
        return Some(first.clone());
    }
    if types.iter().any(|ty| *ty == Type::Dynamic) {
        return Some(Type::Dynamic);
    }
    if types.iter().all(Type::is_primitive) {
        return None;
    }

    if types.iter().all(Type::is_tuple) {
        if let Some(unified) = unify_tuples(types) {
            return Some(unified);
        }
    }
    if types.iter().all(|ty| ty.is_list() || ty.is_tuple()) {
        return unified_element_type(&sequence_element_types(types)).map(Type::list);
    }
    if types.iter().all(Type::is_set) {
        return unified_element_type(&sequence_element_types(types)).map(Type::set);
    }

    if types.iter().all(Type::is_object) {
        if let Some(unified) = unify_objects(types) {
            return Some(unified);
        }
    }
    if types.iter().all(|ty| ty.is_map() || ty.is_object()) {
        return unified_element_type(&keyed_element_types(types)).map(Type::map);
    }

    None
}

/// Unifies the element types of several collections.
///
/// Converting into a collection with a `Dynamic` element type re-unifies the
/// concrete elements, so `Dynamic` only absorbs the column when the other
/// element types unify among themselves.
fn unified_element_type(column: &[Type]) -> Option<Type> {
    let concrete: Vec<Type> = column
        .iter()
        .filter(|ty| **ty != Type::Dynamic)
        .cloned()
        .collect();
    if concrete.len() == column.len() {
        return unified_type(column);
    }
    if concrete.is_empty() {
        return Some(Type::Dynamic);
    }
    unified_type(&concrete).map(|_| Type::Dynamic)
}

/// Position-wise unification of tuples with one shared arity.
fn unify_tuples(types: &[Type]) -> Option<Type> {
    let arity = types.first()?.tuple_element_types()?.len();
    let mut columns: Vec<Vec<Type>> = vec![Vec::with_capacity(types.len()); arity];
    for ty in types {
        let elements = ty.tuple_element_types()?;
        if elements.len() != arity {
            return None;
        }
        for (column, element) in columns.iter_mut().zip(elements) {
            column.push(element.clone());
        }
    }
    columns
        .iter()
        .map(|column| unified_type(column))
        .collect::<Option<Vec<_>>>()
        .map(Type::Tuple)
}

/// Attribute-wise unification of objects sharing one attribute set.
///
/// An attribute optional in any input is optional in the result; marking an
/// attribute optional loses nothing.
fn unify_objects(types: &[Type]) -> Option<Type> {
    let first = types.first()?.object_type()?;
    let names: BTreeSet<&String> = first.attributes.keys().collect();
    let objects = types
        .iter()
        .map(Type::object_type)
        .collect::<Option<Vec<&ObjectType>>>()?;
    if objects
        .iter()
        .any(|obj| obj.attributes.keys().collect::<BTreeSet<_>>() != names)
    {
        return None;
    }

    let mut unified = ObjectType {
        attributes: Default::default(),
        optional: objects
            .iter()
            .flat_map(|obj| obj.optional.iter().cloned())
            .collect(),
    };
    for name in names {
        let column: Vec<Type> = objects
            .iter()
            .filter_map(|obj| obj.attributes.get(name).cloned())
            .collect();
        unified.attributes.insert(name.clone(), unified_type(&column)?);
    }
    Some(Type::Object(unified))
}

fn sequence_element_types(types: &[Type]) -> Vec<Type> {
    let mut elements = Vec::new();
    for ty in types {
        match ty {
            Type::List(e) | Type::Set(e) => elements.push((**e).clone()),
            Type::Tuple(items) => elements.extend(items.iter().cloned()),
            _ => {}
        }
    }
    elements
}

fn keyed_element_types(types: &[Type]) -> Vec<Type> {
    let mut elements = Vec::new();
    for ty in types {
        match ty {
            Type::Map(e) => elements.push((**e).clone()),
            Type::Object(obj) => elements.extend(obj.attributes.values().cloned()),
            _ => {}
        }
    }
    elements
}
