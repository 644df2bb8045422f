//! Chart module - Chart.yaml metadata, change detection and version bumps.

mod bump;
mod error;
mod meta;

pub use bump::*;
pub use error::*;
pub use meta::*;

pub(crate) use meta::lenient_string;
