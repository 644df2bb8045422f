//! Addressing errors.

use super::Path;
use thiserror::Error;

/// PathError represents a failure to parse an address or to navigate a tree with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("{path}: path not found")]
    PathNotFound { path: Path },

    #[error("{path}: type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    /// Creates a path not found error.
    pub fn not_found(path: Path) -> Self {
        PathError::PathNotFound { path }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        PathError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    pub(crate) fn root_target() -> Self {
        PathError::InvalidAddress {
            address: "$".to_string(),
            reason: "the document root cannot be read or written".to_string(),
        }
    }
}
