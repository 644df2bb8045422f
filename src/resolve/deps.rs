//! Chart dependency version resolution.

use super::{parse_tag_version, select::highest, ChartIndex, Constraint, DependencyIndex, ResolveError};
use crate::chart::ChartMeta;
use semver::Version;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, Span};

/// ResolvedDependency is a dependency whose version should change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDependency {
    /// Position in the Chart.yaml `dependencies` list.
    pub index: usize,
    pub name: String,
    pub old_version: String,
    pub new_version: String,
    pub repository: String,
}

/// Picks the best of a chart's published versions for a dependency version expression.
///
/// When the expression parses as a constraint only satisfying versions are considered;
/// otherwise the highest version wins. Versions that do not parse are ignored.
pub fn pick_best_version(versions: &[String], expression: &str) -> Option<String> {
    let constraint = match expression.trim() {
        "" => None,
        text => Constraint::parse(text).ok(),
    };
    let candidates: Vec<(&str, Version)> = versions
        .iter()
        .filter_map(|v| parse_tag_version(v).map(|version| (v.as_str(), version)))
        .filter(|(_, version)| constraint.as_ref().map_or(true, |c| c.matches(version)))
        .collect();
    highest(candidates)
}

fn is_http_repository(repository: &str) -> bool {
    let lower = repository.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Finds newer versions for the dependencies of a chart.
///
/// Only dependencies served from an `http(s)` chart repository are considered. Each
/// repository index is fetched once per call.
pub fn resolve_latest_dependencies(
    meta: &ChartMeta,
    index: &dyn DependencyIndex,
    span: &Span,
) -> Result<Vec<ResolvedDependency>, ResolveError> {
    let mut cache: HashMap<String, ChartIndex> = HashMap::new();
    let mut out = Vec::new();

    for (i, dep) in meta.dependencies.iter().enumerate() {
        let repository = dep.repository.trim();
        debug!(parent: span, index = i, name = %dep.name, repository, expression = %dep.version, "considering dependency");
        if !is_http_repository(repository) {
            continue;
        }

        if !cache.contains_key(repository) {
            let fetched = index.fetch_index(repository)?;
            cache.insert(repository.to_string(), fetched);
        }
        let versions = cache.get(repository).map(|idx| idx.versions(&dep.name)).unwrap_or_default();
        if versions.is_empty() {
            continue;
        }

        let Some(best) = pick_best_version(&versions, &dep.version) else {
            continue;
        };
        if best == dep.version {
            continue;
        }
        debug!(parent: span, name = %dep.name, from = %dep.version, to = %best, "dependency update available");
        out.push(ResolvedDependency {
            index: i,
            name: dep.name.clone(),
            old_version: dep.version.clone(),
            new_version: best,
            repository: repository.to_string(),
        });
    }
    Ok(out)
}
