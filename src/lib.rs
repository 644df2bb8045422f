//! # Chart Bumper
//!
//! Keeps Helm charts current without disturbing their formatting.
//!
//! YAML files are edited through a layout-preserving [`Document`]: rendering an untouched
//! document reproduces its bytes, and a scalar update rewrites only its own line. On top of
//! that the crate finds `# bump:` directives, resolves new image tags, digests and chart
//! dependency versions through pluggable collaborators, and bumps the chart version by the
//! size of the change.
//!
//! ## Modules
//!
//! - [`value`] - Value tree with source layout (indentation, quoting, block scalars)
//! - [`fieldpath`] - `$.a.b[0]` addresses and reads and writes through them
//! - [`document`] - Parsing, rendering and comments of YAML documents
//! - [`directives`] - The `# bump:` directive scanner
//! - [`version`] - Version parsing, change levels and bump arithmetic
//! - [`chart`] - Chart.yaml metadata and the chart version bump
//! - [`resolve`] - Tag, digest and dependency selection over collaborators
//! - [`bump`] - File pipelines and the complete bump run
//! - [`logging`] - Subscriber setup for the command line tool

pub mod bump;
pub mod chart;
pub mod directives;
pub mod document;
pub mod fieldpath;
pub mod logging;
pub mod resolve;
pub mod value;
pub mod version;

pub use bump::{run, BumpError, BumpOptions, BumpReport};
pub use chart::{ChartMeta, Dependency};
pub use directives::{Directive, Strategy};
pub use document::{CommentMap, Document};
pub use fieldpath::{Path, PathElement};
pub use value::Value;
pub use version::{ChangeLevel, Version};
