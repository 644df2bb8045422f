//! Tag selection policy.

use super::{cmp_precedence, parse_tag_version, Constraint, ResolveError, TagLister};
use crate::directives::{Directive, Strategy};
use regex::Regex;
use semver::Version;
use tracing::{debug, Span};

/// TagQuery describes which tag of an image a directive asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagQuery<'a> {
    pub image: &'a str,
    pub strategy: Strategy,
    pub constraint: Option<&'a str>,
    pub tag_regex: Option<&'a str>,
    pub allow_prerelease: bool,
}

impl<'a> TagQuery<'a> {
    pub fn from_directive(directive: &'a Directive) -> Self {
        TagQuery {
            image: &directive.image,
            strategy: directive.strategy,
            constraint: directive.constraint.as_deref(),
            tag_regex: directive.tag_regex.as_deref(),
            allow_prerelease: directive.allow_prerelease,
        }
    }

    fn pattern(&self) -> Result<&'a str, ResolveError> {
        match self.tag_regex {
            Some(pattern) if !pattern.is_empty() => Ok(pattern),
            _ => Err(ResolveError::MissingPattern {
                strategy: self.strategy,
            }),
        }
    }

    fn no_match(&self, reason: impl Into<String>) -> ResolveError {
        ResolveError::NoMatchingTag {
            image: self.image.to_string(),
            reason: reason.into(),
        }
    }
}

/// Lists the tags of the queried image and selects one.
pub fn resolve_tag(lister: &dyn TagLister, query: &TagQuery<'_>, span: &Span) -> Result<String, ResolveError> {
    let tags = lister.list_tags(query.image)?;
    debug!(parent: span, image = query.image, count = tags.len(), "listed tags");
    if tags.is_empty() {
        return Err(query.no_match("no tags found"));
    }
    let tag = select_tag(&tags, query)?;
    debug!(parent: span, image = query.image, strategy = %query.strategy, %tag, "selected tag");
    Ok(tag)
}

/// Selects a tag from `tags` according to the query's strategy.
///
/// - `semver`: the highest version tag, filtered by the optional constraint. Prereleases
///   are skipped unless allowed.
/// - `regex`: tags matching `tagRegex`. With a capture group the captured text is read as
///   a version and ordered like `semver`; without one the lexicographically greatest
///   matching tag wins.
/// - `literal`: `tagRegex` must match exactly one tag.
///
/// When several tags denote the same version the one without a `v` prefix is preferred,
/// otherwise the lexicographically smallest.
pub fn select_tag(tags: &[String], query: &TagQuery<'_>) -> Result<String, ResolveError> {
    match query.strategy {
        Strategy::Semver => select_semver(tags, query),
        Strategy::Regex => select_regex(tags, query),
        Strategy::Literal => select_literal(tags, query),
        Strategy::Digest => Err(ResolveError::UnsupportedStrategy {
            strategy: query.strategy,
        }),
    }
}

fn select_semver(tags: &[String], query: &TagQuery<'_>) -> Result<String, ResolveError> {
    let constraint = query
        .constraint
        .filter(|c| !c.trim().is_empty())
        .map(Constraint::parse)
        .transpose()?;

    let candidates: Vec<(&str, Version)> = tags
        .iter()
        .filter_map(|tag| parse_tag_version(tag).map(|version| (tag.as_str(), version)))
        .filter(|(_, version)| query.allow_prerelease || version.pre.is_empty())
        .filter(|(_, version)| constraint.as_ref().map_or(true, |c| c.matches(version)))
        .collect();

    match (highest(candidates), constraint) {
        (Some(tag), _) => Ok(tag),
        (None, Some(constraint)) => Err(ResolveError::ConstraintViolation {
            image: query.image.to_string(),
            constraint: constraint.to_string(),
        }),
        (None, None) => Err(query.no_match("no semver tags found")),
    }
}

fn select_regex(tags: &[String], query: &TagQuery<'_>) -> Result<String, ResolveError> {
    let pattern = query.pattern()?;
    let re = Regex::new(pattern).map_err(|e| ResolveError::invalid_regex(pattern, e))?;
    let no_match = || query.no_match(format!("no tags match tagRegex {:?}", pattern));

    if re.captures_len() > 1 {
        let candidates: Vec<(&str, Version)> = tags
            .iter()
            .filter_map(|tag| {
                let captured = re.captures(tag)?.get(1)?;
                parse_tag_version(captured.as_str()).map(|version| (tag.as_str(), version))
            })
            .filter(|(_, version)| query.allow_prerelease || version.pre.is_empty())
            .collect();
        return highest(candidates).ok_or_else(no_match);
    }

    tags.iter()
        .filter(|tag| re.is_match(tag))
        .max()
        .cloned()
        .ok_or_else(no_match)
}

fn select_literal(tags: &[String], query: &TagQuery<'_>) -> Result<String, ResolveError> {
    let pattern = query.pattern()?;
    let re = Regex::new(pattern).map_err(|e| ResolveError::invalid_regex(pattern, e))?;

    let mut matches: Vec<String> = tags.iter().filter(|tag| re.is_match(tag)).cloned().collect();
    match matches.len() {
        0 => Err(query.no_match(format!("no tags match tagRegex {:?}", pattern))),
        1 => Ok(matches.remove(0)),
        _ => {
            matches.sort();
            Err(ResolveError::AmbiguousTag {
                image: query.image.to_string(),
                pattern: pattern.to_string(),
                matches,
            })
        }
    }
}

/// Picks the tag with the highest version, breaking ties between spellings of the same
/// version in favor of no `v` prefix, then the lexicographically smallest.
pub(crate) fn highest(candidates: Vec<(&str, Version)>) -> Option<String> {
    let best = candidates
        .iter()
        .map(|(_, version)| version)
        .max_by(|a, b| cmp_precedence(a, b))?
        .clone();

    let mut tied: Vec<&str> = candidates
        .iter()
        .filter(|(_, version)| cmp_precedence(version, &best).is_eq())
        .map(|(tag, _)| *tag)
        .collect();
    tied.sort_unstable();
    tied.iter()
        .find(|tag| !tag.starts_with('v'))
        .or_else(|| tied.first())
        .map(|tag| tag.to_string())
}
