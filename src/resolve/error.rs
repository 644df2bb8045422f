use crate::directives::Strategy;
use std::path::PathBuf;
use thiserror::Error;

/// ResolveError is returned when a new tag, digest or chart version cannot be chosen.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no matching tag for {image}: {reason}")]
    NoMatchingTag { image: String, reason: String },

    #[error("tagRegex {pattern:?} matched multiple tags for {image}; make it more specific (e.g. anchor with ^$). Matches: {matches:?}")]
    AmbiguousTag {
        image: String,
        pattern: String,
        matches: Vec<String>,
    },

    #[error("no semver tags of {image} match constraint {constraint:?}")]
    ConstraintViolation { image: String, constraint: String },

    #[error("invalid {kind} {pattern:?}: {reason}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("strategy={strategy} requires tagRegex")]
    MissingPattern { strategy: Strategy },

    #[error("strategy={strategy} does not select tags")]
    UnsupportedStrategy { strategy: Strategy },

    #[error("{collaborator}: {message}")]
    Collaborator { collaborator: &'static str, message: String },

    #[error("{}: {message}", .file.display())]
    Fixture { file: PathBuf, message: String },

    #[error("{context}: {source}")]
    Git {
        context: String,
        #[source]
        source: git2::Error,
    },
}

impl ResolveError {
    pub(crate) fn invalid_regex(pattern: &str, err: regex::Error) -> Self {
        ResolveError::InvalidPattern {
            kind: "tagRegex",
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn git(context: impl Into<String>, source: git2::Error) -> Self {
        ResolveError::Git {
            context: context.into(),
            source,
        }
    }
}
