//! Bump module - Per-file update pipelines.
//!
//! Each pipeline reads a file, edits it through a [`Document`](crate::document::Document)
//! and hands back the rendered bytes in a [`FileUpdate`]. Writing is a separate step, and
//! [`run`] strings the pipelines together for one chart.

mod chart_version;
mod deps;
mod error;
mod files;
mod images;
mod run;

#[cfg(test)]
mod pipeline_test;

pub use chart_version::*;
pub use deps::*;
pub use error::*;
pub use files::*;
pub use images::*;
pub use run::*;

use crate::fieldpath::Path;
use serde::Serialize;
use std::path::PathBuf;

/// One value changed by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    Image {
        /// 1-based line of the changed scalar.
        line: usize,
        address: Path,
        image: String,
        from: String,
        to: String,
    },
    Dependency {
        index: usize,
        name: String,
        from: String,
        to: String,
    },
}

/// FileUpdate is the outcome of running a pipeline over one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    pub file: PathBuf,
    #[serde(skip)]
    pub original: Vec<u8>,
    #[serde(skip)]
    pub output: Vec<u8>,
    pub changes: Vec<Change>,
}

impl FileUpdate {
    pub(crate) fn unchanged(file: &std::path::Path, original: Vec<u8>) -> Self {
        FileUpdate {
            file: file.to_path_buf(),
            output: original.clone(),
            original,
            changes: Vec::new(),
        }
    }

    pub fn changed(&self) -> bool {
        self.output != self.original
    }

    /// Writes the output if it differs from what is on disk.
    pub fn write(&self) -> Result<bool, BumpError> {
        if !self.changed() {
            return Ok(false);
        }
        write_if_changed(&self.file, &self.output)
    }
}
