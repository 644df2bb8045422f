//! Change levels between two version strings.

use super::Version;
use serde::Serialize;
use std::fmt;

/// ChangeLevel orders changes by severity: `NoChange < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeLevel {
    #[default]
    #[serde(rename = "none")]
    NoChange,
    Patch,
    Minor,
    Major,
}

impl ChangeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeLevel::NoChange => "none",
            ChangeLevel::Patch => "patch",
            ChangeLevel::Minor => "minor",
            ChangeLevel::Major => "major",
        }
    }
}

impl fmt::Display for ChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the level of change from `a` to `b`.
///
/// Identical text is `NoChange`, and so is any pair where either side does not parse.
pub fn compare(a: &str, b: &str) -> ChangeLevel {
    let (a, b) = (a.trim(), b.trim());
    if a == b {
        return ChangeLevel::NoChange;
    }
    let (Ok(va), Ok(vb)) = (Version::parse(a), Version::parse(b)) else {
        return ChangeLevel::NoChange;
    };
    if va.major != vb.major {
        ChangeLevel::Major
    } else if va.minor != vb.minor {
        ChangeLevel::Minor
    } else if va.patch != vb.patch {
        ChangeLevel::Patch
    } else {
        ChangeLevel::NoChange
    }
}
