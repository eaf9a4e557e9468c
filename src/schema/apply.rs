// Recursive default application
//
// Walks a value together with a defaults node, substituting defaults for
// missing or null attributes at every level, then reassembles each
// container either through the unifier (plain mode) or through an exact
// conversion to the node's declared type (exact mode).

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::convert::convert;
use crate::internal::error::{Error, Result};
use crate::schema::defaults::{ChildKey, Defaults};
use crate::schema::unify::{unify_keyed, unify_sequence};
use crate::value::Value;

/// Configuration for applying a defaults tree
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Deepest defaults tree an applier accepts
    pub max_nesting_depth: usize,

    /// Whether results are converted exactly to the declared type
    pub exact: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 32,
            exact: false,
        }
    }
}

/// A shared defaults tree bound to an apply configuration
#[derive(Debug, Clone)]
pub struct DefaultsApplier {
    defaults: Arc<Defaults>,
    config: ApplyConfig,
}

impl DefaultsApplier {
    /// Creates an applier with default configuration
    pub fn new(defaults: Arc<Defaults>) -> Result<Self> {
        Self::with_config(defaults, ApplyConfig::default())
    }

    /// Creates an applier with custom configuration
    ///
    /// Trees deeper than `max_nesting_depth` are rejected here, before any
    /// value is walked.
    pub fn with_config(defaults: Arc<Defaults>, config: ApplyConfig) -> Result<Self> {
        let depth = defaults.depth();
        if depth > config.max_nesting_depth {
            return Err(Error::ConfigError(format!(
                "Defaults tree depth ({}) exceeds maximum nesting depth ({})",
                depth, config.max_nesting_depth
            )));
        }
        Ok(Self { defaults, config })
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Applies the tree to `value` in the configured mode
    pub fn apply(&self, value: Value) -> Result<Value> {
        if self.config.exact {
            self.defaults.apply_and_convert(value)
        } else {
            Ok(self.defaults.apply(value))
        }
    }
}

pub(crate) fn apply_node(defaults: &Defaults, value: Value, exact: bool) -> Result<Value> {
    // Defaults fill attributes inside a present container; they never
    // replace the container itself.
    if !value.is_known() || value.is_null() {
        return Ok(value);
    }
    if defaults.is_empty() {
        return Ok(value);
    }

    let (value, marks) = value.unmark();
    trace!("applying defaults for {} to {:?} value", defaults.ty(), value.shape());

    let applied = match value {
        Value::List { items, .. } | Value::Set { items, .. } | Value::Tuple(items) => {
            let values = apply_to_sequence(defaults, items, exact)?;
            if exact {
                convert_exact(defaults, Value::Tuple(values))?
            } else {
                unify_sequence(defaults.ty(), values)
            }
        }
        Value::Map { entries, .. } | Value::Object(entries) => {
            let mut values = apply_to_keyed(defaults, entries, exact)?;
            fill_defaults(defaults, &mut values, exact)?;
            if exact {
                convert_exact(defaults, Value::Object(values))?
            } else {
                unify_keyed(defaults.ty(), values)
            }
        }
        // Null and unknown returned early; unmark leaves no nested marks.
        bare @ (Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Null(_)
        | Value::Unknown(_)
        | Value::Marked(..)) => bare,
    };

    Ok(applied.with_marks(marks))
}

fn apply_to_sequence(defaults: &Defaults, items: Vec<Value>, exact: bool) -> Result<Vec<Value>> {
    items
        .into_iter()
        .enumerate()
        .map(|(ix, element)| match defaults.sequence_child(ix) {
            Some(child) => apply_node(child, element, exact),
            None => Ok(element),
        })
        .collect()
}

fn apply_to_keyed(
    defaults: &Defaults,
    entries: BTreeMap<String, Value>,
    exact: bool,
) -> Result<BTreeMap<String, Value>> {
    entries
        .into_iter()
        .map(|(key, element)| {
            let element = match defaults.keyed_child(&key) {
                Some(child) => apply_node(child, element, exact)?,
                None => element,
            };
            Ok((key, element))
        })
        .collect()
}

/// Substitutes a default for every attribute that is absent or null.
///
/// A default with a nested node of its own is itself run through that node,
/// so optional attributes inside the default get filled too.
fn fill_defaults(
    defaults: &Defaults,
    values: &mut BTreeMap<String, Value>,
    exact: bool,
) -> Result<()> {
    for (name, default_value) in defaults.default_values() {
        if values.get(name).map_or(false, |v| !v.is_null()) {
            continue;
        }
        debug!("substituting default for attribute {:?}", name);
        let filled = match defaults.child(&ChildKey::Attribute(name.clone())) {
            Some(child) => apply_node(child, default_value.clone(), exact)?,
            None => default_value.clone(),
        };
        values.insert(name.clone(), filled);
    }
    Ok(())
}

fn convert_exact(defaults: &Defaults, assembled: Value) -> Result<Value> {
    let source_type = assembled.ty();
    convert(assembled, defaults.ty()).map_err(|err| {
        debug!(
            "cannot convert {} to declared type {}: {}",
            source_type,
            defaults.ty(),
            err
        );
        Error::mismatch(&source_type, defaults.ty())
    })
}
