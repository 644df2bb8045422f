//! Directive scanning errors.

use std::path::PathBuf;
use thiserror::Error;

/// DirectiveError carries the file and 1-based line of the offending directive or line.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("{}:{}: missing required directive field {field}: {message}", .file.display(), .line)]
    MissingRequiredField {
        file: PathBuf,
        line: usize,
        field: &'static str,
        message: String,
    },

    #[error("{}:{}: malformed directive: {message}", .file.display(), .line)]
    MalformedDirective {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}:{}: unrecognized strategy {strategy:?}", .file.display(), .line)]
    UnrecognizedStrategy {
        file: PathBuf,
        line: usize,
        strategy: String,
    },

    #[error("{}:{}: {message}", .file.display(), .line)]
    MalformedInput {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DirectiveError {
    /// Returns the file the error refers to.
    pub fn file(&self) -> &std::path::Path {
        match self {
            DirectiveError::MissingRequiredField { file, .. }
            | DirectiveError::MalformedDirective { file, .. }
            | DirectiveError::UnrecognizedStrategy { file, .. }
            | DirectiveError::MalformedInput { file, .. }
            | DirectiveError::Io { file, .. } => file,
        }
    }

    /// Returns the line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            DirectiveError::MissingRequiredField { line, .. }
            | DirectiveError::MalformedDirective { line, .. }
            | DirectiveError::UnrecognizedStrategy { line, .. }
            | DirectiveError::MalformedInput { line, .. } => Some(*line),
            DirectiveError::Io { .. } => None,
        }
    }
}
