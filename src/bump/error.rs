use crate::chart::ChartError;
use crate::directives::DirectiveError;
use crate::document::ParseError;
use crate::fieldpath::{Path, PathError};
use crate::resolve::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// BumpError is returned by the bump pipelines, with the file (and line when known) the
/// failure belongs to.
#[derive(Debug, Error)]
pub enum BumpError {
    #[error("{}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error("{}:{}: {source}", .file.display(), .line)]
    Resolve {
        file: PathBuf,
        line: usize,
        #[source]
        source: ResolveError,
    },

    #[error("{}:{}: {source}", .file.display(), .line)]
    Path {
        file: PathBuf,
        line: usize,
        #[source]
        source: PathError,
    },

    #[error("{}:{}: strategy=digest requires a non-empty {address}", .file.display(), .line)]
    MissingDigestTag { file: PathBuf, line: usize, address: Path },

    #[error("{}: dependency {name}: {source}", .file.display())]
    Dependency {
        file: PathBuf,
        name: String,
        #[source]
        source: PathError,
    },

    #[error("{}: {source}", .file.display())]
    Chart {
        file: PathBuf,
        #[source]
        source: ChartError,
    },

    #[error("base chart: {0}")]
    Base(#[source] ResolveError),

    #[error("{}: {source}", .file.display())]
    DependencyIndex {
        file: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("invalid scan glob {pattern:?}: {reason}")]
    Glob { pattern: String, reason: String },

    #[error("{0} is required for this operation")]
    MissingCollaborator(&'static str),

    #[error("{}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BumpError {
    pub(crate) fn io(file: &std::path::Path, source: std::io::Error) -> Self {
        BumpError::Io {
            file: file.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(file: &std::path::Path, source: ParseError) -> Self {
        BumpError::Parse {
            file: file.to_path_buf(),
            source,
        }
    }

    pub(crate) fn chart(file: &std::path::Path, source: ChartError) -> Self {
        BumpError::Chart {
            file: file.to_path_buf(),
            source,
        }
    }
}
