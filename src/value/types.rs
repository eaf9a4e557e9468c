// Dynamic value model for tydefaults
//
// Values are immutable trees. Marks ride on a wrapper variant so that they
// stay orthogonal to shape: `unmark` peels them off before structural
// inspection and `with_marks` puts them back.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::types::{ObjectType, Shape, Type};

/// Opaque data-flow metadata attached to a value, e.g. "sensitive".
pub type Marks = BTreeSet<String>;

/// Represents a dynamically shaped value of a known type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A value of the given type that is not yet known
    Unknown(Type),
    /// An explicitly absent value of the given type
    Null(Type),
    Bool(bool),
    Number(f64),
    String(String),
    List { element: Type, items: Vec<Value> },
    /// Items are deduplicated on construction, first occurrence wins
    Set { element: Type, items: Vec<Value> },
    Map { element: Type, entries: BTreeMap<String, Value> },
    Tuple(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A value carrying a non-empty mark set; never nested
    Marked(Box<Value>, Marks),
}

impl Value {
    pub fn null(ty: Type) -> Self {
        Value::Null(ty)
    }

    pub fn unknown(ty: Type) -> Self {
        Value::Unknown(ty)
    }

    /// Creates a list with an explicit element type.
    pub fn list_of(element: Type, items: Vec<Value>) -> Self {
        Value::List { element, items }
    }

    /// Creates a list whose element type is taken from the first item.
    ///
    /// An empty list gets the `Dynamic` element type.
    pub fn list(items: Vec<Value>) -> Self {
        let element = items.first().map(Value::ty).unwrap_or(Type::Dynamic);
        Value::List { element, items }
    }

    /// Creates a set with an explicit element type, dropping duplicate items.
    pub fn set_of(element: Type, items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set {
            element,
            items: unique,
        }
    }

    /// Creates a set whose element type is taken from the first item.
    pub fn set(items: Vec<Value>) -> Self {
        let element = items.first().map(Value::ty).unwrap_or(Type::Dynamic);
        Value::set_of(element, items)
    }

    /// Creates a map with an explicit element type.
    pub fn map_of<I, K>(element: Type, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Map {
            element,
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items)
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(attributes.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the type of this value, looking through marks.
    pub fn ty(&self) -> Type {
        match self {
            Value::Unknown(ty) | Value::Null(ty) => ty.clone(),
            Value::Bool(_) => Type::Bool,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::List { element, .. } => Type::List(Box::new(element.clone())),
            Value::Set { element, .. } => Type::Set(Box::new(element.clone())),
            Value::Map { element, .. } => Type::Map(Box::new(element.clone())),
            Value::Tuple(items) => Type::Tuple(items.iter().map(Value::ty).collect()),
            Value::Object(attrs) => Type::Object(ObjectType::new(
                attrs.iter().map(|(k, v)| (k.clone(), v.ty())).collect(),
            )),
            Value::Marked(inner, _) => inner.ty(),
        }
    }

    /// Returns the structural classification of this value's type.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Unknown(ty) | Value::Null(ty) => ty.shape(),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Shape::Scalar,
            Value::List { .. } => Shape::List,
            Value::Set { .. } => Shape::Set,
            Value::Map { .. } => Shape::Map,
            Value::Tuple(_) => Shape::Tuple,
            Value::Object(_) => Shape::Object,
            Value::Marked(inner, _) => inner.shape(),
        }
    }

    /// Returns false only for a wholly unknown value.
    pub fn is_known(&self) -> bool {
        match self {
            Value::Unknown(_) => false,
            Value::Marked(inner, _) => inner.is_known(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null(_) => true,
            Value::Marked(inner, _) => inner.is_null(),
            _ => false,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, Value::Marked(..))
    }

    /// Returns a copy of the marks carried by this value.
    pub fn marks(&self) -> Marks {
        match self {
            Value::Marked(_, marks) => marks.clone(),
            _ => Marks::new(),
        }
    }

    /// Splits this value into its bare form and its marks.
    pub fn unmark(self) -> (Value, Marks) {
        match self {
            Value::Marked(inner, marks) => (*inner, marks),
            bare => (bare, Marks::new()),
        }
    }

    /// Attaches `marks` to this value, merging with any marks it already has.
    pub fn with_marks(self, marks: Marks) -> Value {
        if marks.is_empty() {
            return self;
        }
        match self {
            Value::Marked(inner, mut existing) => {
                existing.extend(marks);
                Value::Marked(inner, existing)
            }
            bare => Value::Marked(Box::new(bare), marks),
        }
    }

    /// Attaches a single mark.
    pub fn mark(self, mark: impl Into<String>) -> Value {
        self.with_marks(Marks::from([mark.into()]))
    }

    /// Returns the ordered elements of a list, set or tuple.
    pub fn as_value_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items) => Some(items),
            Value::Marked(inner, _) => inner.as_value_slice(),
            _ => None,
        }
    }

    /// Returns the keyed elements of a map or object.
    pub fn as_value_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map { entries, .. } | Value::Object(entries) => Some(entries),
            Value::Marked(inner, _) => inner.as_value_map(),
            _ => None,
        }
    }

    /// Looks up an attribute of an object or an entry of a map.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.as_value_map().and_then(|entries| entries.get(name))
    }

    /// Looks up an element of a list, set or tuple by position.
    pub fn index(&self, ix: usize) -> Option<&Value> {
        self.as_value_slice().and_then(|items| items.get(ix))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of_nested_value() {
        let v = Value::object([
            ("a", Value::from(1.0)),
            ("b", Value::list(vec![Value::from("x")])),
        ]);
        assert_eq!(
            v.ty(),
            Type::object([("a", Type::Number), ("b", Type::list(Type::String))])
        );
    }

    #[test]
    fn test_null_and_unknown_keep_their_type() {
        assert_eq!(Value::null(Type::Number).ty(), Type::Number);
        assert_eq!(Value::unknown(Type::list(Type::Bool)).shape(), Shape::List);
        assert!(!Value::unknown(Type::Number).is_known());
        assert!(Value::null(Type::Number).is_null());
    }

    #[test]
    fn test_unmark_and_with_marks() {
        let v = Value::from("secret").mark("sensitive");
        assert!(v.is_marked());
        assert_eq!(v.ty(), Type::String);

        let (bare, marks) = v.clone().unmark();
        assert_eq!(bare, Value::from("secret"));
        assert!(marks.contains("sensitive"));
        assert_eq!(bare.with_marks(marks), v);
    }

    #[test]
    fn test_marks_do_not_nest() {
        let v = Value::from(1.0).mark("a").mark("b");
        match &v {
            Value::Marked(inner, marks) => {
                assert_eq!(**inner, Value::from(1.0));
                assert_eq!(marks.len(), 2);
            }
            other => panic!("Expected marked value, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_marks_leave_value_bare() {
        let v = Value::from(true).with_marks(Marks::new());
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_marked_null_is_null() {
        let v = Value::null(Type::String).mark("sensitive");
        assert!(v.is_null());
        assert!(v.is_known());
    }

    #[test]
    fn test_set_deduplicates() {
        let v = Value::set(vec![Value::from(1.0), Value::from(2.0), Value::from(1.0)]);
        assert_eq!(v.as_value_slice().unwrap().len(), 2);
        assert_eq!(v.ty(), Type::set(Type::Number));
    }

    #[test]
    fn test_element_access() {
        let v = Value::tuple(vec![Value::from(1.0), Value::from("two")]).mark("m");
        assert_eq!(v.index(1), Some(&Value::from("two")));
        assert_eq!(v.index(2), None);

        let o = Value::object([("a", Value::from(false))]);
        assert_eq!(o.get_attr("a"), Some(&Value::Bool(false)));
        assert_eq!(o.get_attr("b"), None);
    }
}
