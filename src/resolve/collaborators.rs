//! Interfaces to registries, chart repositories and version control.

use super::ResolveError;
use crate::chart::lenient_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lists the tags published for an image repository such as `ghcr.io/org/app`.
pub trait TagLister {
    fn list_tags(&self, image: &str) -> Result<Vec<String>, ResolveError>;
}

/// Resolves the manifest digest of `image:tag`, optionally for one `os/arch` platform.
pub trait DigestResolver {
    fn resolve_digest(&self, image: &str, tag: &str, platform: Option<&str>) -> Result<String, ResolveError>;
}

/// Fetches the chart index of a chart repository URL.
pub trait DependencyIndex {
    fn fetch_index(&self, repository: &str) -> Result<ChartIndex, ResolveError>;
}

/// Reads a file as it was at some revision.
pub trait HistoricalContentReader {
    /// `path` is repository-relative with forward slashes.
    fn read_at(&self, revision: &str, path: &str) -> Result<Vec<u8>, ResolveError>;
}

/// ChartIndex is the part of a Helm repository `index.yaml` used for dependency updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartIndex {
    pub entries: BTreeMap<String, Vec<ChartVersion>>,
}

/// ChartVersion is one published version of a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartVersion {
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
}

impl ChartIndex {
    /// Parses a Helm repository `index.yaml`.
    pub fn from_yaml(bytes: &[u8]) -> Result<ChartIndex, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    /// Published versions of a chart, in index order.
    pub fn versions(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(|versions| versions.iter().map(|v| v.version.clone()).collect())
            .unwrap_or_default()
    }
}
