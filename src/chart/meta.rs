//! Chart.yaml metadata.

use super::ChartError;
use crate::version::{compare, ChangeLevel};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// File name of the chart metadata inside a chart directory.
pub const CHART_FILE: &str = "Chart.yaml";

/// ChartMeta holds the Chart.yaml fields that take part in change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub app_version: String,
    #[serde(deserialize_with = "lenient_dependencies")]
    pub dependencies: Vec<Dependency>,
}

/// Dependency is one entry of the Chart.yaml `dependencies` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub repository: String,
}

/// Accepts scalars of any type as text; `appVersion: 1.10` is common in the wild.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, found {:?}", other))),
    }
}

fn lenient_dependencies<'de, D>(deserializer: D) -> Result<Vec<Dependency>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Option<Dependency>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}

/// Parses Chart.yaml bytes. Missing fields default to empty.
pub fn load_meta(bytes: &[u8]) -> Result<ChartMeta, ChartError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ChartMeta::default());
    }
    Ok(serde_yaml::from_slice(bytes)?)
}

/// Reads `Chart.yaml` from a chart directory.
pub fn read_chart_yaml(dir: &Path) -> Result<Vec<u8>, ChartError> {
    let file = dir.join(CHART_FILE);
    std::fs::read(&file).map_err(|source| ChartError::Io { file, source })
}

/// Returns the largest change between two charts, looking at `appVersion` and at the
/// versions of dependencies present in both (matched by name).
pub fn compute_change_level(base: &ChartMeta, cur: &ChartMeta) -> ChangeLevel {
    let mut level = compare(&base.app_version, &cur.app_version);

    let base_deps: HashMap<&str, &str> = base
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str()))
        .collect();
    for dep in &cur.dependencies {
        if let Some(old) = base_deps.get(dep.name.as_str()) {
            level = level.max(compare(old, &dep.version));
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dep(name: &str, version: &str) -> Dependency {
        Dependency {
            name: name.to_string(),
            version: version.to_string(),
            repository: String::new(),
        }
    }

    #[test]
    fn test_load_meta() {
        let meta = load_meta(
            b"name: x\nversion: 1.2.3\nappVersion: 1.2.4\ndependencies:\n  - name: redis\n    version: 19.0.0\n    repository: https://charts.example.com\n",
        )
        .unwrap();
        assert_eq!(meta.name, "x");
        assert_eq!(meta.version, "1.2.3");
        assert_eq!(meta.app_version, "1.2.4");
        assert_eq!(
            meta.dependencies,
            vec![Dependency {
                name: "redis".to_string(),
                version: "19.0.0".to_string(),
                repository: "https://charts.example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_load_meta_lenient() {
        let meta = load_meta(b"name: x\nappVersion: 1.10\nkubeVersion: '>=1.25'\ndependencies:\n").unwrap();
        assert_eq!(meta.app_version, "1.1");
        assert_eq!(meta.version, "");
        assert!(meta.dependencies.is_empty());

        assert_eq!(load_meta(b"").unwrap(), ChartMeta::default());
        assert!(load_meta(b"name: [unclosed\n").is_err());
        assert!(load_meta(b"version:\n  nested: map\n").is_err());
    }

    #[test]
    fn test_read_chart_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let want = "name: x\nversion: 0.1.0\n";
        std::fs::write(dir.path().join(CHART_FILE), want).unwrap();
        assert_eq!(read_chart_yaml(dir.path()).unwrap(), want.as_bytes());

        let missing = tempfile::tempdir().unwrap();
        assert!(matches!(read_chart_yaml(missing.path()), Err(ChartError::Io { .. })));
    }

    #[test]
    fn test_compute_change_level_uses_max() {
        let base = ChartMeta {
            app_version: "1.2.3".to_string(),
            dependencies: vec![dep("redis", "19.0.0"), dep("gone", "1.0.0")],
            ..Default::default()
        };
        let cur = ChartMeta {
            app_version: "1.3.0".to_string(),
            dependencies: vec![dep("redis", "20.0.0"), dep("new", "9.0.0")],
            ..Default::default()
        };
        assert_eq!(compute_change_level(&base, &cur), ChangeLevel::Major);

        let cur = ChartMeta {
            app_version: "1.2.4".to_string(),
            dependencies: vec![dep("redis", "19.0.0")],
            ..Default::default()
        };
        assert_eq!(compute_change_level(&base, &cur), ChangeLevel::Patch);
        assert_eq!(compute_change_level(&base, &base), ChangeLevel::NoChange);
    }
}
