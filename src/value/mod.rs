//! Value module - In-memory tree of a parsed YAML document.
//!
//! Maps and lists keep source order and indentation; scalars keep their quoting,
//! so a tree that was not modified renders back to the text it came from.

mod value;

pub use value::*;
