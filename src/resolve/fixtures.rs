//! Offline collaborators backed by YAML fixture files.
//!
//! A registry fixture lists tags and digests per image:
//!
//! ```yaml
//! images:
//!   ghcr.io/example/app:
//!     tags: ["2.3.1", "2.4.0"]
//!     digests:
//!       "2.4.0": sha256:0123...
//!     platforms:
//!       linux/arm64:
//!         "2.4.0": sha256:4567...
//! ```
//!
//! An index fixture maps chart repository URLs to Helm `index.yaml` contents:
//!
//! ```yaml
//! repositories:
//!   https://charts.example.com:
//!     entries:
//!       redis:
//!         - version: 19.6.1
//! ```

use super::{ChartIndex, DependencyIndex, DigestResolver, ResolveError, TagLister};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

fn load<T: for<'de> Deserialize<'de>>(file: &Path) -> Result<T, ResolveError> {
    let fixture = |message: String| ResolveError::Fixture {
        file: file.to_path_buf(),
        message,
    };
    let bytes = std::fs::read(file).map_err(|e| fixture(e.to_string()))?;
    serde_yaml::from_slice(&bytes).map_err(|e| fixture(e.to_string()))
}

/// StaticRegistry answers tag and digest lookups from a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticRegistry {
    pub images: BTreeMap<String, StaticImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticImage {
    pub tags: Vec<String>,
    /// Digest per tag.
    pub digests: BTreeMap<String, String>,
    /// Digest per tag, per `os/arch` platform.
    pub platforms: BTreeMap<String, BTreeMap<String, String>>,
}

impl StaticRegistry {
    pub fn from_file(file: &Path) -> Result<StaticRegistry, ResolveError> {
        load(file)
    }

    pub fn from_yaml(text: &str) -> Result<StaticRegistry, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    fn image(&self, image: &str) -> Result<&StaticImage, ResolveError> {
        self.images.get(image).ok_or_else(|| ResolveError::Collaborator {
            collaborator: "registry",
            message: format!("unknown image {}", image),
        })
    }
}

impl TagLister for StaticRegistry {
    fn list_tags(&self, image: &str) -> Result<Vec<String>, ResolveError> {
        Ok(self.image(image)?.tags.clone())
    }
}

impl DigestResolver for StaticRegistry {
    fn resolve_digest(&self, image: &str, tag: &str, platform: Option<&str>) -> Result<String, ResolveError> {
        let entry = self.image(image)?;
        let digests = match platform {
            Some(platform) => entry.platforms.get(platform).ok_or_else(|| ResolveError::Collaborator {
                collaborator: "registry",
                message: format!("{} has no platform {}", image, platform),
            })?,
            None => &entry.digests,
        };
        digests.get(tag).cloned().ok_or_else(|| ResolveError::Collaborator {
            collaborator: "registry",
            message: format!("no digest for {}:{}", image, tag),
        })
    }
}

/// StaticIndex serves chart repository indexes from a fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticIndex {
    pub repositories: BTreeMap<String, ChartIndex>,
}

impl StaticIndex {
    pub fn from_file(file: &Path) -> Result<StaticIndex, ResolveError> {
        load(file)
    }

    pub fn from_yaml(text: &str) -> Result<StaticIndex, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

impl DependencyIndex for StaticIndex {
    fn fetch_index(&self, repository: &str) -> Result<ChartIndex, ResolveError> {
        let key = repository.trim_end_matches('/');
        self.repositories
            .iter()
            .find(|(url, _)| url.trim_end_matches('/') == key)
            .map(|(_, index)| index.clone())
            .ok_or_else(|| ResolveError::Collaborator {
                collaborator: "chart index",
                message: format!("unknown repository {}", repository),
            })
    }
}
