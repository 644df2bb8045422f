//! Document module - Layout-preserving YAML documents.
//!
//! A [`Document`] is a value tree plus a [`CommentMap`] sidecar. Rendering an unmodified
//! document reproduces its source bytes exactly; edits through [`Document::set_string`]
//! touch only the line holding the replaced scalar.

mod comments;
mod error;
mod parser;
mod render;

#[cfg(test)]
mod roundtrip_test;

pub use comments::*;
pub use error::*;

pub(crate) use parser::{comment_start, is_document_marker, is_sequence_item, quoted_end, split_key};

use crate::fieldpath::{self, Path, PathError};
use crate::value::Value;
use parser::Parser;
use render::Renderer;

/// Line terminator used throughout a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Document is one parsed YAML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Value,
    comments: CommentMap,
    /// Lines up to and including a leading `---` marker.
    preamble: Vec<String>,
    newline: Newline,
    final_newline: bool,
}

impl Document {
    /// Parses raw file content.
    pub fn parse(bytes: &[u8]) -> Result<Document, ParseError> {
        Document::parse_str(std::str::from_utf8(bytes)?)
    }

    /// Parses text.
    pub fn parse_str(text: &str) -> Result<Document, ParseError> {
        let newline = match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => Newline::CrLf,
            _ => Newline::Lf,
        };
        let final_newline = text.ends_with('\n');

        let mut lines: Vec<&str> = text.split('\n').collect();
        if final_newline {
            lines.pop();
        }
        let count = lines.len();
        for (i, line) in lines.iter_mut().enumerate() {
            if i + 1 == count && !final_newline {
                break;
            }
            let current: &str = line;
            match (newline, current.strip_suffix('\r')) {
                (Newline::CrLf, Some(stripped)) => *line = stripped,
                (Newline::Lf, None) => {}
                _ => return Err(ParseError::malformed(i + 1, "mixed line endings")),
            }
        }

        let start = match lines.iter().position(|l| {
            let t = l.trim_start();
            !t.is_empty() && !t.starts_with('#')
        }) {
            Some(i) if is_document_marker(lines[i]) && lines[i].starts_with("---") => {
                let rest = lines[i][3..].trim_start();
                if !(rest.is_empty() || rest.starts_with('#')) {
                    return Err(ParseError::malformed(i + 1, "content after the document marker"));
                }
                i + 1
            }
            _ => 0,
        };
        let preamble = lines[..start].iter().map(|l| l.to_string()).collect();

        let (root, comments) = Parser::new(&lines, start).parse()?;
        Ok(Document {
            root,
            comments,
            preamble,
            newline,
            final_newline,
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn comments(&self) -> &CommentMap {
        &self.comments
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    /// Renders the document back to text.
    pub fn render(&self) -> String {
        let mut lines = self.preamble.clone();
        lines.extend(Renderer::new(&self.comments).render(&self.root));
        lines.extend(self.comments.foot().iter().cloned());

        let newline = self.newline.as_str();
        let mut text = lines.join(newline);
        if self.final_newline {
            text.push_str(newline);
        }
        text
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.render().into_bytes()
    }

    /// Returns the node at `address`.
    pub fn get(&self, address: &str) -> Result<Option<&Value>, PathError> {
        fieldpath::get(&self.root, &Path::parse(address)?)
    }

    /// Returns the textual form of the scalar at `address`.
    pub fn get_string(&self, address: &str) -> Result<Option<String>, PathError> {
        self.get_string_at(&Path::parse(address)?)
    }

    pub fn get_string_at(&self, path: &Path) -> Result<Option<String>, PathError> {
        fieldpath::get_string(&self.root, path)
    }

    /// Writes `value` to the scalar at `address`; returns false when it already holds it.
    pub fn set_string(&mut self, address: &str, value: &str) -> Result<bool, PathError> {
        self.set_string_at(&Path::parse(address)?, value)
    }

    pub fn set_string_at(&mut self, path: &Path, value: &str) -> Result<bool, PathError> {
        fieldpath::set_string(&mut self.root, path, value)
    }
}
