//! Parsing of the `key=value` tokens after `# bump:`.

use super::{DirectiveError, Strategy};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, Span};

const KNOWN_KEYS: &[&str] = &["image", "strategy", "constraint", "tagRegex", "allowPrerelease", "platform"];

/// Settings carried by one directive comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveArgs {
    pub image: String,
    pub strategy: Strategy,
    pub constraint: Option<String>,
    pub tag_regex: Option<String>,
    pub allow_prerelease: bool,
    pub platform: Option<String>,
}

/// A problem with directive arguments, before file and line are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgProblem {
    MissingField { field: &'static str, message: String },
    Malformed(String),
    Strategy(String),
}

impl ArgProblem {
    pub(crate) fn at(self, file: &Path, line: usize) -> DirectiveError {
        let file = file.to_path_buf();
        match self {
            ArgProblem::MissingField { field, message } => DirectiveError::MissingRequiredField {
                file,
                line,
                field,
                message,
            },
            ArgProblem::Malformed(message) => DirectiveError::MalformedDirective { file, line, message },
            ArgProblem::Strategy(strategy) => DirectiveError::UnrecognizedStrategy { file, line, strategy },
        }
    }
}

/// Splits on spaces and tabs outside quotes. Quote characters are dropped, so
/// `tagRegex="^v(.*) x$"` yields the token `tagRegex=^v(.*) x$`.
pub(crate) fn split_args(text: &str) -> Result<Vec<String>, ArgProblem> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match (quote, c) {
            (None, ' ' | '\t') => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (_, c) => current.push(c),
        }
    }
    if quote.is_some() {
        return Err(ArgProblem::Malformed("unterminated quote".to_string()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parses the argument text of a directive.
pub(crate) fn parse_args(text: &str, span: &Span) -> Result<DirectiveArgs, ArgProblem> {
    let mut values: HashMap<String, String> = HashMap::new();
    for token in split_args(text)? {
        let Some((key, value)) = token.split_once('=') else {
            return Err(ArgProblem::Malformed(format!(
                "invalid token {:?} (expected key=value)",
                token
            )));
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(ArgProblem::Malformed(format!(
                "invalid token {:?} (empty key or value)",
                token
            )));
        }
        if !KNOWN_KEYS.contains(&key) {
            debug!(parent: span, key, "ignoring unknown directive key");
        }
        values.insert(key.to_string(), value.to_string());
    }

    let image = values.remove("image").ok_or_else(|| ArgProblem::MissingField {
        field: "image",
        message: "image= is required".to_string(),
    })?;
    if !image.contains('/') || !image.contains('.') {
        return Err(ArgProblem::MissingField {
            field: "image",
            message: format!(
                "image must be a fully-qualified repository (e.g. ghcr.io/org/app); got {:?}",
                image
            ),
        });
    }

    let strategy = match values.remove("strategy") {
        Some(name) => name.parse::<Strategy>().map_err(ArgProblem::Strategy)?,
        None => Strategy::default(),
    };

    let allow_prerelease = match values.remove("allowPrerelease") {
        Some(flag) => flag.parse::<bool>().map_err(|_| {
            ArgProblem::Malformed(format!("allowPrerelease must be true or false, got {:?}", flag))
        })?,
        None => false,
    };

    Ok(DirectiveArgs {
        image,
        strategy,
        constraint: values.remove("constraint"),
        tag_regex: values.remove("tagRegex"),
        allow_prerelease,
        platform: values.remove("platform"),
    })
}
