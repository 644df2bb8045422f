//! Field path module - Addresses of nodes inside a document tree.
//!
//! An address is written `$` followed by `.name` and `[index]` steps, for example
//! `$.image.tag` or `$.dependencies[0].version`. The same textual form is produced by
//! the directive scanner and accepted by the tree accessors in this module.

mod access;
mod error;
mod path;

pub use access::*;
pub use error::*;
pub use path::*;
