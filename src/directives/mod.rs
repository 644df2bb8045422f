//! Directives module - `# bump:` annotations in YAML files.
//!
//! A directive comment names an image and a selection strategy. It applies to the scalar
//! line that follows it, skipping blank lines and other comments:
//!
//! ```yaml
//! image:
//!   # bump: image=ghcr.io/example/app strategy=semver constraint="^2"
//!   tag: "2.3.1"
//! ```

mod args;
mod directive;
mod error;
mod scanner;


pub use directive::*;
pub use error::*;
pub use scanner::*;

pub(crate) use args::DirectiveArgs;
