// tydefaults library entry point
//
// Fills missing optional attributes of dynamically shaped values from a
// defaults tree that mirrors the value's declared type.

pub mod convert;
pub mod internal;
pub mod schema;
pub mod value;

pub use crate::convert::{convert, mismatch_message, unify_safely, Conversion};
pub use crate::internal::error::{Error, Result};
pub use crate::schema::{ApplyConfig, ChildKey, Defaults, DefaultsApplier, ObjectType, Shape, Type};
pub use crate::value::{Marks, Value};
