// Value module for tydefaults
//
// Dynamic values consumed by the defaults applier:
//
// 1. The closed set of value variants, with null/unknown detection
// 2. Mark stripping and reattachment
// 3. JSON decoding (type-directed) and encoding

pub use self::types::{Marks, Value};

pub mod types;
pub mod json;
