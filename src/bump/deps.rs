//! Chart.yaml dependency version updates.

use super::{BumpError, Change, FileUpdate};
use crate::chart::{load_meta, CHART_FILE};
use crate::document::Document;
use crate::fieldpath::{Path, PathElement};
use crate::resolve::{resolve_latest_dependencies, DependencyIndex};
use tracing::{debug, info, Span};

/// Address of the version of the `index`-th dependency.
pub fn dependency_version_path(index: usize) -> Path {
    Path::from_elements(vec![
        PathElement::field_name("dependencies"),
        PathElement::index(index),
        PathElement::field_name("version"),
    ])
}

/// Looks up newer versions for the dependencies of the chart in `chart_dir` and writes
/// them into its Chart.yaml. Nothing is written to disk.
pub fn update_dependencies(
    chart_dir: &std::path::Path,
    index: &dyn DependencyIndex,
    span: &Span,
) -> Result<FileUpdate, BumpError> {
    let file = chart_dir.join(CHART_FILE);
    let original = std::fs::read(&file).map_err(|e| BumpError::io(&file, e))?;
    let meta = load_meta(&original).map_err(|e| BumpError::chart(&file, e))?;
    if meta.dependencies.is_empty() {
        debug!(parent: span, file = %file.display(), "chart has no dependencies");
        return Ok(FileUpdate::unchanged(&file, original));
    }

    let resolved = resolve_latest_dependencies(&meta, index, span).map_err(|source| BumpError::DependencyIndex {
        file: file.clone(),
        source,
    })?;
    if resolved.is_empty() {
        return Ok(FileUpdate::unchanged(&file, original));
    }

    let mut doc = Document::parse(&original).map_err(|e| BumpError::parse(&file, e))?;
    let mut changes = Vec::new();
    for dep in resolved {
        let path = dependency_version_path(dep.index);
        let changed = doc
            .set_string_at(&path, &dep.new_version)
            .map_err(|source| BumpError::Dependency {
                file: file.clone(),
                name: dep.name.clone(),
                source,
            })?;
        if changed {
            info!(parent: span, name = %dep.name, from = %dep.old_version, to = %dep.new_version, "updated dependency");
            changes.push(Change::Dependency {
                index: dep.index,
                name: dep.name,
                from: dep.old_version,
                to: dep.new_version,
            });
        }
    }

    if changes.is_empty() {
        return Ok(FileUpdate::unchanged(&file, original));
    }
    Ok(FileUpdate {
        output: doc.to_bytes(),
        file,
        original,
        changes,
    })
}
