//! Comment sidecar keyed by node address.

use crate::fieldpath::Path;
use std::collections::HashMap;

/// Comments holds the source text around one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Whole lines (comments and blank lines) directly preceding the node.
    pub before: Vec<String>,
    /// Everything after the node's value on its own line, leading whitespace included.
    pub inline: Option<String>,
}

/// CommentMap associates comment text with node positions.
///
/// Entries whose node no longer exists are never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentMap {
    nodes: HashMap<Path, Comments>,
    foot: Vec<String>,
}

impl CommentMap {
    /// Creates an empty comment map.
    pub fn new() -> Self {
        CommentMap::default()
    }

    /// Returns the comments recorded for `path`.
    pub fn get(&self, path: &Path) -> Option<&Comments> {
        self.nodes.get(path)
    }

    /// Lines preceding the node at `path`.
    pub fn before(&self, path: &Path) -> &[String] {
        self.nodes.get(path).map_or(&[], |c| c.before.as_slice())
    }

    /// Text following the value of the node at `path`.
    pub fn inline(&self, path: &Path) -> Option<&str> {
        self.nodes.get(path).and_then(|c| c.inline.as_deref())
    }

    pub fn set_before(&mut self, path: Path, lines: Vec<String>) {
        self.nodes.entry(path).or_default().before = lines;
    }

    pub fn set_inline(&mut self, path: Path, text: impl Into<String>) {
        self.nodes.entry(path).or_default().inline = Some(text.into());
    }

    /// Lines after the last node of the document.
    pub fn foot(&self) -> &[String] {
        &self.foot
    }

    pub fn set_foot(&mut self, lines: Vec<String>) {
        self.foot = lines;
    }

    /// Returns the number of nodes carrying comments.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.foot.is_empty()
    }
}
