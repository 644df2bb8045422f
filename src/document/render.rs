//! Renders a tree and its comment sidecar back to lines.

use super::comments::CommentMap;
use crate::fieldpath::{Path, PathElement};
use crate::value::{List, Map, Value};

pub(crate) struct Renderer<'a> {
    comments: &'a CommentMap,
    out: Vec<String>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(comments: &'a CommentMap) -> Self {
        Renderer {
            comments,
            out: Vec::new(),
        }
    }

    /// Emits the top-level node and returns the collected lines.
    pub(crate) fn render(mut self, root: &Value) -> Vec<String> {
        let path = Path::new();
        match root {
            Value::Map(map) if !map.is_flow() => self.emit_map(map, &path, None),
            Value::List(list) if !list.is_flow() => self.emit_list(list, &path, None),
            Value::Map(_) => self.out.push("{}".to_string()),
            Value::List(_) => self.out.push("[]".to_string()),
            Value::Scalar(scalar) if !scalar.raw().is_empty() => self.out.push(scalar.raw().to_string()),
            Value::Scalar(_) => {}
        }
        self.out
    }

    fn emit_before(&mut self, path: &Path) {
        self.out.extend(self.comments.before(path).iter().cloned());
    }

    fn inline(&self, path: &Path) -> &'a str {
        self.comments.inline(path).unwrap_or("")
    }

    /// `lead` replaces the indentation of the first key when the map starts on a `- ` line.
    fn emit_map(&mut self, map: &Map, path: &Path, lead: Option<String>) {
        let mut lead = lead;
        for entry in map.entries() {
            let child = path.with(PathElement::FieldName(entry.key().to_string()));
            self.emit_before(&child);
            let prefix = lead.take().unwrap_or_else(|| " ".repeat(map.indent()));
            let head = format!("{}{}:", prefix, entry.key_raw());
            self.emit_value(entry.value(), &child, head, entry.sep());
        }
    }

    fn emit_list(&mut self, list: &List, path: &Path, lead: Option<String>) {
        let mut lead = lead;
        for (index, item) in list.items().enumerate() {
            let child = path.with(PathElement::Index(index));
            self.emit_before(&child);
            let prefix = lead.take().unwrap_or_else(|| " ".repeat(list.indent()));
            let dash = format!("{}-", prefix);
            // An inline comment on the item keeps the dash on its own line.
            let compact = !item.gap().is_empty() && self.comments.inline(&child).is_none();
            match item.value() {
                Value::Map(map) if !map.is_flow() && compact => {
                    self.emit_map(map, &child, Some(format!("{}{}", dash, item.gap())))
                }
                Value::List(inner) if !inner.is_flow() && compact => {
                    self.emit_list(inner, &child, Some(format!("{}{}", dash, item.gap())))
                }
                value => self.emit_value(value, &child, dash, item.gap()),
            }
        }
    }

    fn emit_value(&mut self, value: &Value, path: &Path, head: String, sep: &str) {
        let inline = self.inline(path);
        match value {
            Value::Scalar(scalar) => {
                self.out.push(format!("{}{}{}{}", head, sep, scalar.raw(), inline));
                self.out.extend(scalar.body().iter().cloned());
            }
            Value::Map(map) if map.is_flow() => self.out.push(format!("{}{}{{}}{}", head, sep, inline)),
            Value::List(list) if list.is_flow() => self.out.push(format!("{}{}[]{}", head, sep, inline)),
            Value::Map(map) => {
                self.out.push(format!("{}{}", head, inline));
                self.emit_map(map, path, None);
            }
            Value::List(list) => {
                self.out.push(format!("{}{}", head, inline));
                self.emit_list(list, path, None);
            }
        }
    }
}
