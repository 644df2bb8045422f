//! Chart version bump.

use super::ChartError;
use crate::document::Document;
use crate::version::{bump_version, ChangeLevel};
use tracing::{debug, Span};

/// Address of the chart version in Chart.yaml.
pub const VERSION_ADDRESS: &str = "$.version";

/// Bumps `$.version` of a parsed Chart.yaml by `level`.
///
/// Returns whether the document changed. `NoChange` leaves the document untouched even
/// when the written version carries a `v` prefix.
pub fn apply_version_bump(doc: &mut Document, level: ChangeLevel, span: &Span) -> Result<bool, ChartError> {
    let current = match doc.get_string(VERSION_ADDRESS)? {
        Some(current) if !current.trim().is_empty() => current,
        _ => return Err(ChartError::MissingVersion),
    };
    if level == ChangeLevel::NoChange {
        debug!(parent: span, version = %current, "no change detected");
        return Ok(false);
    }

    let next = bump_version(&current, level)?;
    if next == current {
        return Ok(false);
    }
    debug!(parent: span, from = %current, to = %next, %level, "bumping chart version");
    Ok(doc.set_string(VERSION_ADDRESS, &next)?)
}
