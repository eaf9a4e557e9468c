// Schema module for tydefaults
//
// This module provides the declared type model and the defaults machinery
// built on it. It includes:
//
// 1. Static types with shape classification
// 2. Immutable defaults trees mirroring a declared type
// 3. The recursive applier, in plain and exact modes
// 4. Reassembly of containers into their most specific representation

// Re-export public types and functions
pub use self::types::{ObjectType, Shape, Type};
pub use self::defaults::{ChildKey, Defaults};
pub use self::apply::{ApplyConfig, DefaultsApplier};

// Sub-modules
pub mod types;
pub mod defaults;
pub mod apply;

// Internal module for container reassembly
mod unify;
