//! Parse errors.

use thiserror::Error;

/// ParseError is returned for text outside the supported YAML subset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl ParseError {
    /// Creates a malformed input error for a 1-based line number.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        ParseError::MalformedInput {
            line,
            message: message.into(),
        }
    }

    /// Returns the line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedInput { line, .. } => Some(*line),
            ParseError::InvalidUtf8(_) => None,
        }
    }
}
