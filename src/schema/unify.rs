// Reassembly of containers after defaults are applied
//
// Filling defaults can leave a collection with elements of different types.
// These functions pick the most specific representation that still holds
// every element: a list, set or map when the element types unify, and a
// tuple or object otherwise.

use std::collections::BTreeMap;

use log::debug;

use crate::convert::{unify_safely, Conversion};
use crate::schema::types::Type;
use crate::value::Value;

/// Reassembles the elements of a list, set or tuple.
pub(crate) fn unify_sequence(target: &Type, values: Vec<Value>) -> Value {
    if target.is_tuple() {
        return Value::Tuple(values);
    }
    if values.is_empty() {
        return match target.element_type() {
            Some(element) if target.is_list() => Value::list_of(element.clone(), values),
            Some(element) if target.is_set() => Value::set_of(element.clone(), values),
            _ => Value::Tuple(values),
        };
    }

    let types: Vec<Type> = values.iter().map(Value::ty).collect();
    let (unified, conversions) = unify_safely(&types);
    let Some(unified) = unified else {
        debug!("no common element type for {}, keeping a tuple", target);
        return Value::Tuple(values);
    };
    assemble_sequence(target, unified, values, &conversions)
}

/// Builds the list or set of `unified`, or a tuple if a conversion fails.
fn assemble_sequence(
    target: &Type,
    unified: Type,
    values: Vec<Value>,
    conversions: &[Option<Conversion>],
) -> Value {
    let values = match convert_all(values, conversions) {
        Ok(converted) => converted,
        Err(original) => return Value::Tuple(original),
    };
    if target.is_set() {
        Value::set_of(unified, values)
    } else {
        Value::list_of(unified, values)
    }
}

/// Reassembles the entries of a map or object.
pub(crate) fn unify_keyed(target: &Type, values: BTreeMap<String, Value>) -> Value {
    if target.is_object() {
        return Value::Object(values);
    }
    if values.is_empty() {
        return match target.element_type() {
            Some(element) if target.is_map() => Value::Map {
                element: element.clone(),
                entries: values,
            },
            _ => Value::Object(values),
        };
    }

    // BTreeMap iteration is lexicographic by key, so the type list and the
    // conversions line up in a deterministic order.
    let (keys, elements): (Vec<String>, Vec<Value>) = values.into_iter().unzip();
    let types: Vec<Type> = elements.iter().map(Value::ty).collect();
    let (unified, conversions) = unify_safely(&types);
    let Some(unified) = unified else {
        debug!("no common element type for {}, keeping an object", target);
        return Value::Object(keys.into_iter().zip(elements).collect());
    };
    assemble_keyed(unified, keys, elements, &conversions)
}

/// Builds the map of `unified`, or an object if a conversion fails.
fn assemble_keyed(
    unified: Type,
    keys: Vec<String>,
    elements: Vec<Value>,
    conversions: &[Option<Conversion>],
) -> Value {
    match convert_all(elements, conversions) {
        Ok(converted) => Value::map_of(unified, keys.into_iter().zip(converted)),
        Err(original) => Value::Object(keys.into_iter().zip(original).collect()),
    }
}

/// Applies the per-element conversions, handing back the untouched
/// elements if any of them fails.
fn convert_all(
    values: Vec<Value>,
    conversions: &[Option<Conversion>],
) -> Result<Vec<Value>, Vec<Value>> {
    if conversions.iter().all(Option::is_none) {
        return Ok(values);
    }
    let mut converted = Vec::with_capacity(values.len());
    for (value, conversion) in values.iter().zip(conversions) {
        match conversion {
            None => converted.push(value.clone()),
            Some(conversion) => match conversion.apply(value.clone()) {
                Ok(v) => converted.push(v),
                Err(err) => {
                    debug!(
                        "conversion to {} failed, keeping heterogeneous values: {}",
                        conversion.target(),
                        err
                    );
                    return Err(values);
                }
            },
        }
    }
    Ok(converted)
}
