//! Version parsing and bump arithmetic.

use super::ChangeLevel;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// VersionError is returned when text is not a `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("not a semantic version: {text:?}")]
    NotSemver { text: String },

    #[error("cannot apply a {level} bump to {version}: component out of range")]
    Overflow { version: String, level: ChangeLevel },
}

/// Version is a `MAJOR.MINOR.PATCH` triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version { major, minor, patch }
    }

    /// Parses `1.2.3` or `v1.2.3`, ignoring surrounding whitespace.
    pub fn parse(text: &str) -> Result<Version, VersionError> {
        let not_semver = || VersionError::NotSemver {
            text: text.to_string(),
        };
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let mut parts = [0u64; 3];
        let mut count = 0;
        for part in digits.split('.') {
            if count == 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(not_semver());
            }
            parts[count] = part.parse().map_err(|_| not_semver())?;
            count += 1;
        }
        if count != 3 {
            return Err(not_semver());
        }
        Ok(Version::new(parts[0], parts[1], parts[2]))
    }

    /// Returns the next version for a change of the given level.
    pub fn bumped(&self, level: ChangeLevel) -> Result<Version, VersionError> {
        let next = |part: u64| {
            part.checked_add(1).ok_or_else(|| VersionError::Overflow {
                version: self.to_string(),
                level,
            })
        };
        Ok(match level {
            ChangeLevel::Major => Version::new(next(self.major)?, 0, 0),
            ChangeLevel::Minor => Version::new(self.major, next(self.minor)?, 0),
            ChangeLevel::Patch => Version::new(self.major, self.minor, next(self.patch)?),
            ChangeLevel::NoChange => *self,
        })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Computes the version that follows `current` for a change of `level`.
///
/// The result is always printed without a `v` prefix. With `NoChange` the version is
/// returned normalized but otherwise unchanged.
pub fn bump_version(current: &str, level: ChangeLevel) -> Result<String, VersionError> {
    Ok(Version::parse(current)?.bumped(level)?.to_string())
}
