//! Directive record and tag selection strategy.

use crate::fieldpath::Path;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How a directive picks the new value for its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest semantic version tag.
    #[default]
    Semver,
    /// Tags matching `tagRegex`, ordered by the first capture group when there is one.
    Regex,
    /// The single tag matching `tagRegex`.
    Literal,
    /// Content digest of the image tag recorded next to the target.
    Digest,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Semver => "semver",
            Strategy::Regex => "regex",
            Strategy::Literal => "literal",
            Strategy::Digest => "digest",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    /// Strategy names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "semver" => Ok(Strategy::Semver),
            "regex" => Ok(Strategy::Regex),
            "literal" => Ok(Strategy::Literal),
            "digest" => Ok(Strategy::Digest),
            _ => Err(s.to_string()),
        }
    }
}

/// Directive is one `# bump:` annotation matched to the scalar line that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub file: PathBuf,
    /// 1-based line of the `# bump:` comment.
    pub line: usize,
    /// 1-based line of the target scalar.
    pub target_line: usize,
    pub address: Path,
    pub image: String,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_regex: Option<String>,
    pub allow_prerelease: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// The target's value as written, quotes included and trailing comment removed.
    pub current_text: String,
}
