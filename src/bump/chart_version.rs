//! Chart version bump from a base and a current Chart.yaml.

use super::BumpError;
use crate::chart::{apply_version_bump, compute_change_level, load_meta, VERSION_ADDRESS};
use crate::document::Document;
use crate::version::ChangeLevel;
use serde::Serialize;
use std::path::Path;
use tracing::{info, Span};

/// ChartBump is the outcome of comparing a chart against its base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBump {
    pub level: ChangeLevel,
    pub changed: bool,
    pub old_version: Option<String>,
    pub new_version: Option<String>,
    /// Rendered current Chart.yaml, bumped when `changed`.
    #[serde(skip)]
    pub output: Vec<u8>,
}

/// Computes the change level between `base` and `cur` and bumps the chart version of
/// `cur` accordingly. `file` names the current Chart.yaml in errors.
pub fn bump_chart(base: &[u8], cur: &[u8], file: &Path, span: &Span) -> Result<ChartBump, BumpError> {
    let base_meta = load_meta(base).map_err(|e| BumpError::chart(file, e))?;
    let cur_meta = load_meta(cur).map_err(|e| BumpError::chart(file, e))?;
    let level = compute_change_level(&base_meta, &cur_meta);
    info!(parent: span, %level, "computed change level");

    let mut doc = Document::parse(cur).map_err(|e| BumpError::parse(file, e))?;
    let old_version = doc.get_string(VERSION_ADDRESS).ok().flatten();
    let changed = apply_version_bump(&mut doc, level, span).map_err(|e| BumpError::chart(file, e))?;
    let new_version = doc.get_string(VERSION_ADDRESS).ok().flatten();
    if changed {
        info!(
            parent: span,
            from = old_version.as_deref().unwrap_or_default(),
            to = new_version.as_deref().unwrap_or_default(),
            "bumped chart version"
        );
    }

    Ok(ChartBump {
        level,
        changed,
        old_version,
        new_version,
        output: doc.to_bytes(),
    })
}
