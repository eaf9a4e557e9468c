// Defaults trees for tydefaults
//
// This module defines the immutable tree of default values that mirrors a
// declared type, and the two entry points that apply it to a value.

use std::collections::BTreeMap;

use crate::internal::error::Result;
use crate::schema::apply::apply_node;
use crate::schema::types::Type;
use crate::value::Value;

/// Identifies the child of a defaults node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildKey {
    /// The single element of a list, set or map
    Element,
    /// A position of a tuple
    Index(usize),
    /// A named attribute of an object
    Attribute(String),
}

impl ChildKey {
    pub fn attribute(name: impl Into<String>) -> Self {
        ChildKey::Attribute(name.into())
    }
}

/// A type tree carrying default values for optional object attributes at
/// any level.
///
/// A tree is built once, then shared read-only (typically behind an `Arc`)
/// and applied to any number of values. Applying never mutates the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    ty: Type,
    default_values: BTreeMap<String, Value>,
    children: BTreeMap<ChildKey, Defaults>,
}

impl Defaults {
    /// Creates a node for values of type `ty`, with no defaults or children
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            default_values: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Adds the default value used when attribute `name` is missing or null
    pub fn with_default(mut self, name: impl Into<String>, value: Value) -> Self {
        self.default_values.insert(name.into(), value);
        self
    }

    /// Adds a nested node
    ///
    /// The key must fit this node's type: `Element` for lists, sets and
    /// maps, `Index` for tuples, `Attribute` for objects.
    pub fn with_child(mut self, key: ChildKey, child: Defaults) -> Self {
        self.children.insert(key, child);
        self
    }

    /// Returns the declared type of values at this node
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn default_values(&self) -> &BTreeMap<String, Value> {
        &self.default_values
    }

    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.default_values.get(name)
    }

    pub fn children(&self) -> &BTreeMap<ChildKey, Defaults> {
        &self.children
    }

    pub fn child(&self, key: &ChildKey) -> Option<&Defaults> {
        self.children.get(key)
    }

    /// Returns true if this node has nothing to apply
    pub fn is_empty(&self) -> bool {
        self.default_values.is_empty() && self.children.is_empty()
    }

    /// Number of node levels in this tree, counting this one
    pub fn depth(&self) -> usize {
        1 + self.children.values().map(Defaults::depth).max().unwrap_or(0)
    }

    /// Child node for the element at position `ix` of a sequence
    pub fn sequence_child(&self, ix: usize) -> Option<&Defaults> {
        match &self.ty {
            ty if ty.is_collection() => self.children.get(&ChildKey::Element),
            Type::Tuple(_) => self.children.get(&ChildKey::Index(ix)),
            _ => None,
        }
    }

    /// Child node for the entry at `key` of an object or map
    pub fn keyed_child(&self, key: &str) -> Option<&Defaults> {
        match &self.ty {
            ty if ty.is_collection() => self.children.get(&ChildKey::Element),
            Type::Object(_) => self.children.get(&ChildKey::Attribute(key.to_string())),
            _ => None,
        }
    }

    /// Applies defaults wherever optional attributes are missing or null.
    ///
    /// The result may have a different type from `value`; unification picks
    /// the most specific collection type it can. To force the declared type,
    /// use [`Defaults::apply_and_convert`].
    ///
    /// # Panics
    ///
    /// Panics if this tree's default values disagree with its declared
    /// types. That is a defect in how the tree was built.
    pub fn apply(&self, value: Value) -> Value {
        match apply_node(self, value, false) {
            Ok(applied) => applied,
            Err(err) => panic!(
                "internal invariant violated: defaults tree disagrees with its declared types: {}",
                err
            ),
        }
    }

    /// Applies defaults and converts the result exactly to the declared type.
    ///
    /// Fails with `Error::MismatchError` when the value cannot take the
    /// declared type.
    pub fn apply_and_convert(&self, value: Value) -> Result<Value> {
        apply_node(self, value, true)
    }
}
