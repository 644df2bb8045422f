//! Version module - Three-part version numbers and change levels.
//!
//! Versions here are the strict `MAJOR.MINOR.PATCH` form (an optional leading `v` is
//! accepted). Anything else is classified as not semver and never forces a bump.

mod level;
mod version;

pub use level::*;
pub use version::*;
