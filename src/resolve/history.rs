//! File contents at a git revision.

use super::{HistoricalContentReader, ResolveError};
use git2::{ObjectType, Repository};
use std::path::{Path, PathBuf};
use tracing::{debug, Span};

/// GitHistory reads blobs from the repository containing `root`.
pub struct GitHistory {
    repo: Repository,
    span: Span,
}

impl GitHistory {
    /// Opens the repository at or above `root`.
    pub fn open(root: &Path, span: &Span) -> Result<GitHistory, ResolveError> {
        let repo = Repository::discover(root)
            .map_err(|e| ResolveError::git(format!("open git repo at {}", root.display()), e))?;
        debug!(parent: span, root = %root.display(), "opened git repository");
        Ok(GitHistory {
            repo,
            span: span.clone(),
        })
    }

    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    /// Candidate spellings of a revision, most specific first.
    pub fn revision_candidates(revision: &str) -> Vec<String> {
        let mut candidates = vec![revision.to_string()];
        if revision.starts_with("origin/") {
            candidates.push(format!("refs/remotes/{}", revision));
        }
        if !revision.starts_with("refs/") {
            candidates.push(format!("refs/heads/{}", revision));
            candidates.push(format!("refs/remotes/origin/{}", revision));
        }
        candidates
    }

    fn resolve_commit(&self, revision: &str) -> Result<git2::Commit<'_>, ResolveError> {
        let candidates = Self::revision_candidates(revision);
        debug!(parent: &self.span, revision, ?candidates, "resolving revision");

        let mut last_err = None;
        for candidate in &candidates {
            match self.repo.revparse_single(candidate).and_then(|obj| obj.peel_to_commit()) {
                Ok(commit) => {
                    debug!(parent: &self.span, candidate = %candidate, id = %commit.id(), "resolved");
                    return Ok(commit);
                }
                Err(e) => last_err = Some(e),
            }
        }
        let source = last_err.unwrap_or_else(|| git2::Error::from_str("no candidates"));
        Err(ResolveError::git(
            format!("unable to resolve git ref {:?} (tried {:?})", revision, candidates),
            source,
        ))
    }
}

impl HistoricalContentReader for GitHistory {
    fn read_at(&self, revision: &str, path: &str) -> Result<Vec<u8>, ResolveError> {
        let path = path.replace('\\', "/");
        let path = path.trim_start_matches("./");
        if path.is_empty() {
            return Err(ResolveError::Collaborator {
                collaborator: "git",
                message: "empty repository-relative path".to_string(),
            });
        }

        let commit = self.resolve_commit(revision)?;
        let context = || format!("read {:?} at ref {:?}", path, revision);
        let tree = commit.tree().map_err(|e| ResolveError::git(context(), e))?;
        let entry = tree.get_path(Path::new(path)).map_err(|e| ResolveError::git(context(), e))?;
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(ResolveError::Collaborator {
                collaborator: "git",
                message: format!("{}: not a file", context()),
            });
        }
        let object = entry.to_object(&self.repo).map_err(|e| ResolveError::git(context(), e))?;
        let blob = object.peel_to_blob().map_err(|e| ResolveError::git(context(), e))?;

        debug!(parent: &self.span, path, len = blob.content().len(), "read bytes");
        Ok(blob.content().to_vec())
    }
}
