//! Single-pass line scanner that finds `# bump:` directives and computes target addresses.
//!
//! The scanner never builds a tree. It tracks open scopes with an indentation stack and
//! prints the same `$.a[0].b` form the document accessors accept.

use super::args::parse_args;
use super::{Directive, DirectiveArgs, DirectiveError};
use crate::document::{comment_start, is_document_marker, is_sequence_item, quoted_end, split_key};
use crate::fieldpath::{Path, PathElement};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{self, PathBuf};
use tracing::{debug, Span};

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#\s*bump:\s*(.*)$").expect("directive pattern is valid"));

/// One open scope: a container-opening key or a sequence item.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Key { indent: usize, key: String },
    Index { indent: usize, index: usize },
}

impl Frame {
    fn indent(&self) -> usize {
        match self {
            Frame::Key { indent, .. } | Frame::Index { indent, .. } => *indent,
        }
    }
}

#[derive(Debug, Default)]
struct PathStack {
    frames: Vec<Frame>,
}

impl PathStack {
    /// Closes scopes opened at `indent` or deeper; used before a key line.
    fn pop_to_key(&mut self, indent: usize) {
        while self.frames.last().is_some_and(|f| f.indent() >= indent) {
            self.frames.pop();
        }
    }

    /// Opens or advances the sequence whose dashes sit at `indent`.
    ///
    /// Deeper scopes are closed. A key at the same column stays open: that is a
    /// sequence written flush with its parent key.
    fn enter_item(&mut self, indent: usize) {
        while self.frames.last().is_some_and(|f| f.indent() > indent) {
            self.frames.pop();
        }
        match self.frames.last_mut() {
            Some(Frame::Index { indent: top, index }) if *top == indent => *index += 1,
            _ => self.frames.push(Frame::Index { indent, index: 0 }),
        }
    }

    fn path(&self) -> Path {
        self.frames
            .iter()
            .map(|frame| match frame {
                Frame::Key { key, .. } => PathElement::FieldName(key.clone()),
                Frame::Index { index, .. } => PathElement::Index(*index),
            })
            .collect()
    }
}

/// What a content line holds after its key or dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineValue<'a> {
    /// Nothing on the line; children may follow.
    Opener,
    /// A scalar on the same line, as written.
    Scalar(&'a str),
    /// A `|` or `>` header; the body lines follow.
    Block(&'a str),
    /// `[]` or `{}`.
    Collection,
}

/// Rejects plain values that would open a nested mapping or sequence on the same line.
fn classify(rest: &str) -> Result<LineValue<'_>, &'static str> {
    let text = rest.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(LineValue::Opener);
    }
    let value = match text.as_bytes()[0] {
        b'"' | b'\'' => match quoted_end(text) {
            Some(close) => LineValue::Scalar(&text[..=close]),
            None => LineValue::Scalar(text),
        },
        b'|' | b'>' => LineValue::Block(text.split_whitespace().next().unwrap_or(text)),
        b'[' | b'{' => LineValue::Collection,
        _ => {
            let plain = text[..comment_start(text).unwrap_or(text.len())].trim_end();
            if is_sequence_item(plain) {
                return Err("sequence item not allowed here");
            }
            if plain.contains(": ") || plain.ends_with(':') {
                return Err("mapping value not allowed here");
            }
            LineValue::Scalar(plain)
        }
    };
    Ok(value)
}

/// A scalar line a pending directive can bind to.
struct Target<'a> {
    path: Path,
    text: &'a str,
}

/// Scanner state for one file.
struct Scan<'s> {
    file: PathBuf,
    stack: PathStack,
    /// Column of the key or dash owning a block scalar whose body is being skipped.
    block_owner: Option<usize>,
    /// Directive waiting for its target line, with the comment's line number.
    pending: Option<(usize, DirectiveArgs)>,
    seen_content: bool,
    out: Vec<Directive>,
    span: &'s Span,
}

impl<'s> Scan<'s> {
    fn malformed_input(&self, line: usize, message: impl Into<String>) -> DirectiveError {
        DirectiveError::MalformedInput {
            file: self.file.clone(),
            line,
            message: message.into(),
        }
    }

    fn malformed_directive(&self, line: usize, message: impl Into<String>) -> DirectiveError {
        DirectiveError::MalformedDirective {
            file: self.file.clone(),
            line,
            message: message.into(),
        }
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<(), DirectiveError> {
        if let Some(owner) = self.block_owner {
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            if raw.trim().is_empty() || indent > owner {
                return Ok(());
            }
            self.block_owner = None;
        }

        if let Some(captures) = DIRECTIVE_RE.captures(raw) {
            if let Some((previous, _)) = &self.pending {
                return Err(self.malformed_directive(
                    number,
                    format!("directive on line {} has no target before this directive", previous),
                ));
            }
            let text = captures.get(1).map_or("", |m| m.as_str());
            let args = parse_args(text, self.span).map_err(|p| p.at(&self.file, number))?;
            self.pending = Some((number, args));
            return Ok(());
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let text = raw.trim_start_matches(' ');
        let indent = raw.len() - text.len();
        if text.starts_with('\t') {
            return Err(self.malformed_input(number, "tab character in indentation"));
        }
        if is_document_marker(text) {
            if self.seen_content || !text.starts_with("---") {
                return Err(self.malformed_input(number, "multiple documents in one file are not supported"));
            }
            self.seen_content = true;
            return Ok(());
        }
        self.seen_content = true;

        let target = self.content(number, indent, text)?;
        if let Some((directive_line, args)) = self.pending.take() {
            let Some(target) = target else {
                return Err(self.malformed_directive(
                    number,
                    format!(
                        "directive on line {} must precede a scalar value (e.g. tag: \"1.2.3\")",
                        directive_line
                    ),
                ));
            };
            if !target.path.is_addressable() {
                return Err(self.malformed_directive(
                    number,
                    format!("target {:?} cannot be written as an address", target.path.to_string()),
                ));
            }
            debug!(parent: self.span, line = directive_line, address = %target.path, "matched directive");
            self.out.push(Directive {
                file: self.file.clone(),
                line: directive_line,
                target_line: number,
                address: target.path,
                image: args.image,
                strategy: args.strategy,
                constraint: args.constraint,
                tag_regex: args.tag_regex,
                allow_prerelease: args.allow_prerelease,
                platform: args.platform,
                current_text: target.text.to_string(),
            });
        }
        Ok(())
    }

    /// Applies a content line to the stack. Returns the scalar it assigns, if any.
    fn content<'t>(&mut self, number: usize, indent: usize, text: &'t str) -> Result<Option<Target<'t>>, DirectiveError> {
        if is_sequence_item(text) {
            self.stack.enter_item(indent);
            let after_dash = &text[1..];
            let rest = after_dash.trim_start_matches(' ');
            let column = indent + 1 + (after_dash.len() - rest.len());
            if rest.starts_with('#') {
                return Ok(None);
            }
            if is_sequence_item(rest) || split_key(rest).is_some() {
                return self.content(number, column, rest);
            }
            let value = classify(after_dash).map_err(|msg| self.malformed_input(number, msg))?;
            return Ok(self.value(indent, self.stack.path(), value));
        }

        let Some((key, _, rest)) = split_key(text) else {
            return Err(self.malformed_input(number, "unsupported line (expected key: value or a sequence item)"));
        };
        self.stack.pop_to_key(indent);
        let value = classify(rest).map_err(|msg| self.malformed_input(number, msg))?;
        if value == LineValue::Opener {
            self.stack.frames.push(Frame::Key { indent, key });
            return Ok(None);
        }
        let path = self.stack.path().with(PathElement::FieldName(key));
        Ok(self.value(indent, path, value))
    }

    fn value<'t>(&mut self, owner: usize, path: Path, value: LineValue<'t>) -> Option<Target<'t>> {
        match value {
            LineValue::Scalar(text) => Some(Target { path, text }),
            LineValue::Block(header) => {
                self.block_owner = Some(owner);
                Some(Target { path, text: header })
            }
            LineValue::Opener | LineValue::Collection => None,
        }
    }

    fn finish(mut self) -> Result<Vec<Directive>, DirectiveError> {
        if let Some((line, _)) = self.pending.take() {
            return Err(self.malformed_directive(line, "directive has no following scalar value"));
        }
        Ok(self.out)
    }
}

/// Scans `text` as the content of `file`. Directives are returned in line order.
pub fn scan_str(file: impl Into<PathBuf>, text: &str, span: &Span) -> Result<Vec<Directive>, DirectiveError> {
    let mut scan = Scan {
        file: file.into(),
        stack: PathStack::default(),
        block_owner: None,
        pending: None,
        seen_content: false,
        out: Vec::new(),
        span,
    };
    for (i, raw) in text.lines().enumerate() {
        scan.line(i + 1, raw)?;
    }
    scan.finish()
}

/// Reads and scans one file.
pub fn scan_file(file: &path::Path, span: &Span) -> Result<Vec<Directive>, DirectiveError> {
    debug!(parent: span, path = %file.display(), "scanning file for bump directives");
    let text = std::fs::read_to_string(file).map_err(|source| DirectiveError::Io {
        file: file.to_path_buf(),
        source,
    })?;
    let directives = scan_str(file, &text, span)?;
    debug!(parent: span, path = %file.display(), count = directives.len(), "scan complete");
    Ok(directives)
}

/// Scans several files; the result is ordered by (file, line).
pub fn scan_files<P: AsRef<path::Path>>(files: &[P], span: &Span) -> Result<Vec<Directive>, DirectiveError> {
    let mut directives = Vec::new();
    for file in files {
        directives.extend(scan_file(file.as_ref(), span)?);
    }
    directives.sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));
    Ok(directives)
}
