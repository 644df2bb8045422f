//! Resolve module - Choosing new tags, digests and chart versions.
//!
//! Registries, chart repositories and version control are reached through the
//! collaborator traits in this module. The selection policy on top of them is pure and
//! works on plain lists of tags or versions.

mod collaborators;
mod constraint;
mod deps;
mod error;
mod fixtures;
mod history;
mod select;

pub use collaborators::*;
pub use constraint::*;
pub use deps::*;
pub use error::*;
pub use fixtures::*;
pub use history::*;
pub use select::*;
