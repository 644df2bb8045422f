//! Line-oriented parser for the supported YAML subset.

use super::comments::CommentMap;
use super::error::ParseError;
use crate::fieldpath::{Path, PathElement};
use crate::value::{Item, List, Map, MapEntry, Scalar, ScalarStyle, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[|>]([1-9][-+]?|[-+][1-9]?)?$").expect("block header pattern is valid"));

/// A content line: indentation counted in spaces, text starting after it.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

/// What follows `key:` or `-` on the same line.
enum Inline<'a> {
    /// No value on this line; `trailing` is the rest of the line.
    Empty { trailing: &'a str },
    Scalar {
        sep: &'a str,
        style: ScalarStyle,
        raw: &'a str,
        trailing: &'a str,
    },
    Flow {
        sep: &'a str,
        map: bool,
        trailing: &'a str,
    },
}

pub(crate) struct Parser<'a> {
    lines: &'a [&'a str],
    pos: usize,
    /// Comment and blank lines not yet attached to a node.
    pending: Vec<String>,
    /// Remainder of a `- ` line, re-read as a line of its own at a deeper column.
    virtual_line: Option<Line<'a>>,
    comments: CommentMap,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `lines` starting at index `start`.
    pub(crate) fn new(lines: &'a [&'a str], start: usize) -> Self {
        Parser {
            lines,
            pos: start,
            pending: Vec::new(),
            virtual_line: None,
            comments: CommentMap::new(),
        }
    }

    /// Parses the remaining lines into a tree and its comment sidecar.
    pub(crate) fn parse(mut self) -> Result<(Value, CommentMap), ParseError> {
        let root = match self.peek()? {
            None => Value::Scalar(Scalar::null()),
            Some(line) => {
                let root = self.parse_node(line, &Path::new())?;
                if let Some(extra) = self.peek()? {
                    return Err(ParseError::malformed(
                        extra.number,
                        "unexpected content after the top-level node",
                    ));
                }
                root
            }
        };
        self.comments.set_foot(std::mem::take(&mut self.pending));
        Ok((root, self.comments))
    }

    /// Returns the next content line without consuming it. Comment and blank lines
    /// passed on the way are moved to `pending`.
    fn peek(&mut self) -> Result<Option<Line<'a>>, ParseError> {
        if let Some(line) = self.virtual_line {
            return Ok(Some(line));
        }
        while let Some(raw) = self.lines.get(self.pos) {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                self.pending.push(raw.to_string());
                self.pos += 1;
                continue;
            }

            let number = self.pos + 1;
            let text = raw.trim_start_matches(' ');
            if text.starts_with('\t') {
                return Err(ParseError::malformed(number, "tab character in indentation"));
            }
            if is_document_marker(text) {
                return Err(ParseError::malformed(
                    number,
                    "multiple documents in one file are not supported",
                ));
            }
            return Ok(Some(Line {
                number,
                indent: raw.len() - text.len(),
                text,
            }));
        }
        Ok(None)
    }

    fn consume(&mut self) {
        if self.virtual_line.take().is_none() {
            self.pos += 1;
        }
    }

    fn attach_before(&mut self, path: &Path) {
        if !self.pending.is_empty() {
            let lines = std::mem::take(&mut self.pending);
            self.comments.set_before(path.clone(), lines);
        }
    }

    fn attach_inline(&mut self, path: &Path, trailing: &str) {
        if !trailing.is_empty() {
            self.comments.set_inline(path.clone(), trailing);
        }
    }

    fn parse_node(&mut self, line: Line<'a>, path: &Path) -> Result<Value, ParseError> {
        if is_sequence_item(line.text) {
            return Ok(Value::List(self.parse_list(line.indent, path)?));
        }
        if split_key(line.text).is_some() {
            return Ok(Value::Map(self.parse_map(line.indent, path)?));
        }
        Err(ParseError::malformed(
            line.number,
            "expected a mapping key or a sequence item",
        ))
    }

    fn parse_map(&mut self, indent: usize, path: &Path) -> Result<Map, ParseError> {
        let mut map = Map::new(indent);
        while let Some(line) = self.peek()? {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::malformed(line.number, "unexpected indentation"));
            }
            if is_sequence_item(line.text) {
                return Err(ParseError::malformed(
                    line.number,
                    "sequence item where a mapping key was expected",
                ));
            }
            let Some((key, key_raw, rest)) = split_key(line.text) else {
                return Err(ParseError::malformed(line.number, "expected a mapping key"));
            };
            if map.has(&key) {
                return Err(ParseError::malformed(
                    line.number,
                    format!("duplicate mapping key {:?}", key),
                ));
            }
            self.consume();

            let child = path.with(PathElement::FieldName(key.clone()));
            self.attach_before(&child);
            let (sep, value) = self.parse_value(rest, indent, &child, line.number, true)?;
            map.push_entry(MapEntry::new(key, key_raw.to_string(), sep, value));
        }
        Ok(map)
    }

    fn parse_list(&mut self, indent: usize, path: &Path) -> Result<List, ParseError> {
        let mut list = List::new(indent);
        while let Some(line) = self.peek()? {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::malformed(line.number, "unexpected indentation"));
            }
            if !is_sequence_item(line.text) {
                break;
            }
            self.consume();

            let child = path.with(PathElement::Index(list.len()));
            self.attach_before(&child);

            let after_dash = &line.text[1..];
            let rest = after_dash.trim_start_matches(' ');
            let gap = &after_dash[..after_dash.len() - rest.len()];
            let nested = !rest.starts_with('#') && (is_sequence_item(rest) || split_key(rest).is_some());
            let item = if nested {
                let inner = Line {
                    number: line.number,
                    indent: indent + 1 + gap.len(),
                    text: rest,
                };
                self.virtual_line = Some(inner);
                Item::new(gap.to_string(), self.parse_node(inner, &child)?)
            } else {
                let (sep, value) = self.parse_value(after_dash, indent, &child, line.number, false)?;
                Item::new(sep, value)
            };
            list.push_item(item);
        }
        Ok(list)
    }

    /// Parses the value that follows `key:` or `-`. `owner_indent` is the column of the
    /// key or dash; nested content and block scalar bodies must be indented past it.
    fn parse_value(
        &mut self,
        rest: &'a str,
        owner_indent: usize,
        path: &Path,
        number: usize,
        same_indent_list: bool,
    ) -> Result<(String, Value), ParseError> {
        match split_value(rest, number)? {
            Inline::Empty { trailing } => {
                self.attach_inline(path, trailing);
                let value = match self.peek()? {
                    Some(next) if next.indent > owner_indent => self.parse_node(next, path)?,
                    Some(next)
                        if same_indent_list && next.indent == owner_indent && is_sequence_item(next.text) =>
                    {
                        Value::List(self.parse_list(owner_indent, path)?)
                    }
                    _ => Value::Scalar(Scalar::null()),
                };
                Ok((String::new(), value))
            }
            Inline::Scalar {
                sep,
                style,
                raw,
                trailing,
            } => {
                self.attach_inline(path, trailing);
                let scalar = match style {
                    ScalarStyle::Literal | ScalarStyle::Folded => {
                        let (body, blanks) = self.read_block(owner_indent);
                        Scalar::from_source(style, raw, body).with_trailing_blanks(blanks)
                    }
                    _ => Scalar::from_source(style, raw, Vec::new()),
                };
                Ok((sep.to_string(), Value::Scalar(scalar)))
            }
            Inline::Flow { sep, map, trailing } => {
                self.attach_inline(path, trailing);
                let value = if map {
                    Value::Map(Map::flow_empty(owner_indent + 2))
                } else {
                    Value::List(List::flow_empty(owner_indent + 2))
                };
                Ok((sep.to_string(), value))
            }
        }
    }

    /// Collects the body of a block scalar: blank lines and lines indented past the owner.
    /// Trailing blank lines are left for whatever node comes next; their count is returned
    /// alongside the body.
    fn read_block(&mut self, owner_indent: usize) -> (Vec<String>, usize) {
        let mut body = Vec::new();
        while let Some(raw) = self.lines.get(self.pos) {
            let blank = raw.trim().is_empty();
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            if !blank && indent <= owner_indent {
                break;
            }
            body.push(raw.to_string());
            self.pos += 1;
        }
        let keep = body
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        let blanks = body.len() - keep;
        self.pending.extend(body.drain(keep..));
        (body, blanks)
    }
}

fn split_value(rest: &str, number: usize) -> Result<Inline<'_>, ParseError> {
    let body = rest.trim_start_matches([' ', '\t']);
    let sep = &rest[..rest.len() - body.len()];
    if body.is_empty() || body.starts_with('#') {
        return Ok(Inline::Empty { trailing: rest });
    }

    match body.as_bytes()[0] {
        b'"' => {
            let close = closing_double(body)
                .ok_or_else(|| ParseError::malformed(number, "unterminated double-quoted scalar"))?;
            Ok(Inline::Scalar {
                sep,
                style: ScalarStyle::DoubleQuoted,
                raw: &body[..=close],
                trailing: check_trailing(&body[close + 1..], number)?,
            })
        }
        b'\'' => {
            let close = closing_single(body)
                .ok_or_else(|| ParseError::malformed(number, "unterminated single-quoted scalar"))?;
            Ok(Inline::Scalar {
                sep,
                style: ScalarStyle::SingleQuoted,
                raw: &body[..=close],
                trailing: check_trailing(&body[close + 1..], number)?,
            })
        }
        b'|' | b'>' => {
            let end = body.find([' ', '\t']).unwrap_or(body.len());
            let header = &body[..end];
            if !BLOCK_HEADER_RE.is_match(header) {
                return Err(ParseError::malformed(
                    number,
                    format!("invalid block scalar header {:?}", header),
                ));
            }
            let style = if header.starts_with('|') {
                ScalarStyle::Literal
            } else {
                ScalarStyle::Folded
            };
            Ok(Inline::Scalar {
                sep,
                style,
                raw: header,
                trailing: check_trailing(&body[end..], number)?,
            })
        }
        b'[' | b'{' => {
            let map = match body.get(..2) {
                Some("{}") => true,
                Some("[]") => false,
                _ => {
                    return Err(ParseError::malformed(
                        number,
                        "flow collections other than [] and {} are not supported",
                    ))
                }
            };
            Ok(Inline::Flow {
                sep,
                map,
                trailing: check_trailing(&body[2..], number)?,
            })
        }
        b'&' => Err(ParseError::malformed(number, "anchors are not supported")),
        b'*' => Err(ParseError::malformed(number, "aliases are not supported")),
        b'!' => Err(ParseError::malformed(number, "tags are not supported")),
        _ => {
            let end = comment_start(body).unwrap_or(body.len());
            let raw = body[..end].trim_end();
            if is_sequence_item(raw) {
                return Err(ParseError::malformed(number, "sequence item not allowed here"));
            }
            if raw.contains(": ") || raw.ends_with(':') {
                return Err(ParseError::malformed(number, "mapping value not allowed here"));
            }
            Ok(Inline::Scalar {
                sep,
                style: ScalarStyle::Plain,
                raw,
                trailing: &body[raw.len()..],
            })
        }
    }
}

/// Accepts text after a value only when it is whitespace, optionally ending in a comment.
fn check_trailing(after: &str, number: usize) -> Result<&str, ParseError> {
    let rest = after.trim_start_matches([' ', '\t']);
    if rest.is_empty() || (rest.starts_with('#') && rest.len() < after.len()) {
        Ok(after)
    } else {
        Err(ParseError::malformed(
            number,
            format!("unexpected text after value: {:?}", rest),
        ))
    }
}

/// Byte offset of a `#` that starts a comment (preceded by whitespace).
pub(crate) fn comment_start(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (1..bytes.len()).find(|&i| bytes[i] == b'#' && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t'))
}

/// Offset of the quote closing a quoted scalar that starts at the beginning of `text`.
pub(crate) fn quoted_end(text: &str) -> Option<usize> {
    match text.as_bytes().first()? {
        b'"' => closing_double(text),
        b'\'' => closing_single(text),
        _ => None,
    }
}

fn closing_double(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn closing_single(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Returns true for `-` and `- ...` lines.
pub(crate) fn is_sequence_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

pub(crate) fn is_document_marker(text: &str) -> bool {
    ["---", "..."].iter().any(|marker| {
        text.strip_prefix(marker)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
    })
}

/// Splits `key: rest` into the key's text, the key as written, and everything after the colon.
pub(crate) fn split_key(text: &str) -> Option<(String, &str, &str)> {
    let first = text.chars().next()?;
    let (key, end) = match first {
        '"' => {
            let close = closing_double(text)?;
            let raw = &text[..=close];
            (Scalar::from_source(ScalarStyle::DoubleQuoted, raw, Vec::new()).text(), close + 1)
        }
        '\'' => {
            let close = closing_single(text)?;
            let raw = &text[..=close];
            (Scalar::from_source(ScalarStyle::SingleQuoted, raw, Vec::new()).text(), close + 1)
        }
        c if "[]{}#&*!|>%@`?,".contains(c) => return None,
        _ => {
            let colon = mapping_colon(text)?;
            let key = text[..colon].trim_end();
            if key.is_empty() {
                return None;
            }
            (key.to_string(), colon)
        }
    };
    let rest = text[end..].strip_prefix(':')?;
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some((key, &text[..end], rest))
}

/// Offset of the first `:` that ends a plain key, stopping at a comment.
fn mapping_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'#' if i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') => return None,
            b':' if i + 1 == bytes.len() || bytes[i + 1] == b' ' || bytes[i + 1] == b'\t' => {
                return Some(i)
            }
            _ => {}
        }
    }
    None
}
