// Static type model for tydefaults
//
// This module defines the declared types that defaults trees and dynamic
// values are described by, together with the classification queries the
// applier and the unifier dispatch on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Structural classification shared by types and values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    List,
    Set,
    Tuple,
    Object,
    Map,
}

/// Represents the declared type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Any type; conversions to it are the identity
    Dynamic,
    /// Boolean type
    Bool,
    /// Number type
    Number,
    /// UTF-8 string type
    String,
    /// Ordered collection of a single element type
    List(Box<Type>),
    /// Unordered, deduplicated collection of a single element type
    Set(Box<Type>),
    /// String-keyed collection of a single element type
    Map(Box<Type>),
    /// Fixed-length sequence of per-position types
    Tuple(Vec<Type>),
    /// Named attributes, some of which may be optional
    Object(ObjectType),
}

/// Attribute types of an object, plus the names that may be omitted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObjectType {
    /// Attribute types by name
    pub attributes: BTreeMap<String, Type>,
    /// Names of attributes that may be absent from a conforming value
    pub optional: BTreeSet<String>,
}

impl ObjectType {
    /// Creates an object type with no optional attributes
    pub fn new(attributes: BTreeMap<String, Type>) -> Self {
        Self {
            attributes,
            optional: BTreeSet::new(),
        }
    }

    /// Returns true if the named attribute may be omitted
    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }

    /// Returns the type of the named attribute
    pub fn attribute_type(&self, name: &str) -> Option<&Type> {
        self.attributes.get(name)
    }
}

impl Type {
    /// Creates a list type
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    /// Creates a set type
    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    /// Creates a map type
    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    /// Creates an object type with no optional attributes
    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(ObjectType::new(
            attributes.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        ))
    }

    /// Creates an object type where the listed attribute names are optional
    pub fn object_with_optional<I, K, O, N>(attributes: I, optional: O) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
        O: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Type::Object(ObjectType {
            attributes: attributes.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            optional: optional.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the structural classification of this type
    ///
    /// `Dynamic` is classified as a scalar; it has no structure to walk.
    pub fn shape(&self) -> Shape {
        match self {
            Type::Dynamic | Type::Bool | Type::Number | Type::String => Shape::Scalar,
            Type::List(_) => Shape::List,
            Type::Set(_) => Shape::Set,
            Type::Map(_) => Shape::Map,
            Type::Tuple(_) => Shape::Tuple,
            Type::Object(_) => Shape::Object,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Type::Set(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Type::Object(_))
    }

    /// Returns true for bool, number and string
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    /// Returns true for list, set and map: the single-element-type collections
    pub fn is_collection(&self) -> bool {
        matches!(self, Type::List(_) | Type::Set(_) | Type::Map(_))
    }

    /// Returns the element type of a list, set or map
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(e) | Type::Set(e) | Type::Map(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the per-position types of a tuple
    pub fn tuple_element_types(&self) -> Option<&[Type]> {
        match self {
            Type::Tuple(types) => Some(types),
            _ => None,
        }
    }

    /// Returns the object type description of an object
    pub fn object_type(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns a short name for this type, without element details
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Type::Dynamic => "dynamic",
            Type::Bool => "bool",
            Type::Number => "number",
            Type::String => "string",
            Type::List(_) => "list",
            Type::Set(_) => "set",
            Type::Map(_) => "map",
            Type::Tuple(_) => "tuple",
            Type::Object(_) => "object",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List(e) => write!(f, "list of {}", e),
            Type::Set(e) => write!(f, "set of {}", e),
            Type::Map(e) => write!(f, "map of {}", e),
            Type::Tuple(types) => {
                f.write_str("tuple (")?;
                for (ix, ty) in types.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                f.write_str(")")
            }
            Type::Object(obj) => {
                // Optional attributes are suffixed with '?'
                f.write_str("object {")?;
                for (ix, (name, ty)) in obj.attributes.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    let optional = if obj.is_optional(name) { "?" } else { "" };
                    write!(f, "{}{}: {}", name, optional, ty)?;
                }
                f.write_str("}")
            }
            other => f.write_str(other.friendly_name()),
        }
    }
}
