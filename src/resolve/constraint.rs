//! Version constraints and lenient tag versions.
//!
//! Constraints follow the syntax common to chart and image tooling: comparators joined by
//! commas or spaces, alternatives joined by `||`, hyphen ranges (`1.2 - 1.4`), wildcards
//! (`1.2.x`) and `~`/`~>`/`^` ranges. A bare version is an exact match.

use super::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version, VersionReq};
use std::cmp::Ordering;
use std::fmt;

static TAG_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$")
        .expect("tag version pattern is valid")
});

static HYPHEN_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S+)\s+-\s+(\S+)\s*$").expect("hyphen range pattern is valid"));

const OPERATOR_CHARS: &[char] = &['=', '<', '>', '~', '^', '!'];

/// Parses a tag as a version, accepting a `v` prefix and a missing minor or patch part.
///
/// `1` reads as `1.0.0` and `v1.2` as `1.2.0`. Returns `None` for anything else.
pub fn parse_tag_version(tag: &str) -> Option<Version> {
    let caps = TAG_VERSION_RE.captures(tag)?;
    let number = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let mut version = Version::new(number(1)?, number(2)?, number(3)?);
    if let Some(pre) = caps.get(4) {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = caps.get(5) {
        version.build = BuildMetadata::new(build.as_str()).ok()?;
    }
    Some(version)
}

/// Orders versions by precedence, ignoring build metadata.
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Constraint is a set of alternative version requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    text: String,
    alternatives: Vec<VersionReq>,
}

impl Constraint {
    pub fn parse(text: &str) -> Result<Constraint, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidPattern {
            kind: "constraint",
            pattern: text.to_string(),
            reason,
        };

        let mut alternatives = Vec::new();
        for alternative in text.split("||") {
            let normalized = normalize(alternative).map_err(invalid)?;
            let req = VersionReq::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
            alternatives.push(req);
        }
        Ok(Constraint {
            text: text.to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Rewrites one `||` alternative into the comma-separated form `VersionReq` reads.
fn normalize(alternative: &str) -> Result<String, String> {
    if alternative.trim().is_empty() {
        return Err("empty constraint".to_string());
    }
    if let Some(caps) = HYPHEN_RANGE_RE.captures(alternative) {
        return Ok(format!(
            ">={}, <={}",
            strip_v(&caps[1]),
            strip_v(&caps[2])
        ));
    }

    let mut comparators = Vec::new();
    let mut operator = String::new();
    for token in alternative.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            operator.push_str(token);
            continue;
        }
        let token = format!("{}{}", std::mem::take(&mut operator), token);
        comparators.push(comparator(&token)?);
    }
    if !operator.is_empty() {
        return Err(format!("operator {:?} without a version", operator));
    }
    Ok(comparators.join(", "))
}

fn comparator(token: &str) -> Result<String, String> {
    let split = token.find(|c: char| !OPERATOR_CHARS.contains(&c)).unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let version = strip_v(version);
    let op = match op {
        "~>" => "~",
        "==" => "=",
        "!=" => return Err("!= is not supported".to_string()),
        other => other,
    };
    let wildcard = version == "*" || version.split('.').any(|part| matches!(part, "x" | "X" | "*"));
    if op.is_empty() && !wildcard {
        return Ok(format!("={}", version));
    }
    Ok(format!("{}{}", op, version))
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}
