//! The full bump run over one chart.

use super::{
    bump_chart, expand_scan_globs, update_dependencies, update_images_in_file, write_if_changed, BumpError,
    ChartBump, FileUpdate, Resolvers,
};
use crate::resolve::{DependencyIndex, DigestResolver, HistoricalContentReader, TagLister};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Span};

/// Where the base Chart.yaml comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSource {
    File(PathBuf),
    /// A file at a version control revision; `path` is repository-relative.
    Revision { revision: String, path: String },
}

/// BumpOptions configures [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOptions {
    /// The current Chart.yaml. Its directory is the chart directory.
    pub chart: PathBuf,
    pub base: BaseSource,
    /// Write changed files. Image and dependency updates only run when set.
    pub write: bool,
    pub update_images: bool,
    pub update_deps: bool,
    /// Comma-separated file patterns, relative to the chart directory, scanned for
    /// directives.
    pub scan_globs: String,
}

/// External services a run may need. Missing ones are only an error when used.
#[derive(Clone, Copy, Default)]
pub struct Collaborators<'a> {
    pub tags: Option<&'a dyn TagLister>,
    pub digests: Option<&'a dyn DigestResolver>,
    pub index: Option<&'a dyn DependencyIndex>,
    pub history: Option<&'a dyn HistoricalContentReader>,
}

/// BumpReport describes what a run did.
#[derive(Debug, Clone)]
pub struct BumpReport {
    pub chart: ChartBump,
    /// Files whose content changed, in processing order.
    pub updates: Vec<FileUpdate>,
    /// Files written to disk.
    pub written: Vec<PathBuf>,
}

impl BumpReport {
    /// Whether anything was written.
    pub fn changed(&self) -> bool {
        !self.written.is_empty()
    }
}

fn read_base(base: &BaseSource, history: Option<&dyn HistoricalContentReader>, span: &Span) -> Result<Vec<u8>, BumpError> {
    match base {
        BaseSource::File(file) => std::fs::read(file).map_err(|e| BumpError::io(file, e)),
        BaseSource::Revision { revision, path } => {
            let history = history.ok_or(BumpError::MissingCollaborator("version control history"))?;
            debug!(parent: span, revision = %revision, path = %path, "reading base chart");
            history.read_at(revision, path).map_err(BumpError::Base)
        }
    }
}

fn chart_dir(chart: &Path) -> PathBuf {
    match chart.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Runs image updates, dependency updates and the chart version bump, in that order.
///
/// The base chart is read first, so a base file inside the chart directory is not
/// affected by the updates.
pub fn run(options: &BumpOptions, collaborators: Collaborators<'_>, span: &Span) -> Result<BumpReport, BumpError> {
    let base = read_base(&options.base, collaborators.history, span)?;
    let dir = chart_dir(&options.chart);
    let mut updates = Vec::new();
    let mut written = Vec::new();

    if !options.write && (options.update_images || options.update_deps) {
        warn!(parent: span, "image and dependency updates require --write; skipping them");
    }

    if options.write && options.update_images {
        let resolvers = match (collaborators.tags, collaborators.digests) {
            (Some(tags), Some(digests)) => Resolvers { tags, digests },
            _ => return Err(BumpError::MissingCollaborator("container registry")),
        };
        for file in expand_scan_globs(&dir, &options.scan_globs)? {
            let update = update_images_in_file(&file, resolvers, span)?;
            if update.changed() {
                if update.write()? {
                    info!(parent: span, file = %file.display(), "wrote image updates");
                    written.push(file);
                }
                updates.push(update);
            }
        }
    }

    if options.write && options.update_deps {
        let index = collaborators
            .index
            .ok_or(BumpError::MissingCollaborator("chart repository index"))?;
        let update = update_dependencies(&dir, index, span)?;
        if update.changed() {
            if update.write()? {
                info!(parent: span, file = %update.file.display(), "wrote dependency updates");
                if !written.contains(&update.file) {
                    written.push(update.file.clone());
                }
            }
            updates.push(update);
        }
    }

    let cur = std::fs::read(&options.chart).map_err(|e| BumpError::io(&options.chart, e))?;
    let chart = bump_chart(&base, &cur, &options.chart, span)?;
    if options.write && chart.changed && write_if_changed(&options.chart, &chart.output)? {
        info!(parent: span, file = %options.chart.display(), "wrote chart version");
        if !written.contains(&options.chart) {
            written.push(options.chart.clone());
        }
    }

    Ok(BumpReport { chart, updates, written })
}
