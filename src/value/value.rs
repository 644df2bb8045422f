//! Core value types and operations.

use once_cell::sync::Lazy;
use regex::Regex;

static INT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-+]?[0-9]+|0x[0-9a-fA-F]+|0o[0-7]+)$").expect("int pattern is valid")
});

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?|[-+]?\.(inf|Inf|INF)|\.(nan|NaN|NAN))$")
        .expect("float pattern is valid")
});

/// Value is one node of a document: a scalar, an ordered map or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(Scalar),
    Map(Map),
    List(List),
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar.
    Literal,
    /// `>` block scalar.
    Folded,
}

/// The resolved type of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Null,
    Bool,
    Int,
    Float,
    String,
}

/// Scalar keeps its source representation so rendering reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    style: ScalarStyle,
    /// Text on the owning line: quotes included, or the header (`|-`) of a block scalar.
    raw: String,
    /// Verbatim body lines of a block scalar.
    body: Vec<String>,
    /// Blank lines after a block body. Rendered as trivia, counted by `+` chomping.
    trailing_blanks: usize,
}

impl Scalar {
    /// An empty (null) scalar, as in `key:`.
    pub fn null() -> Self {
        Scalar {
            style: ScalarStyle::Plain,
            raw: String::new(),
            body: Vec::new(),
            trailing_blanks: 0,
        }
    }

    pub(crate) fn from_source(style: ScalarStyle, raw: impl Into<String>, body: Vec<String>) -> Self {
        Scalar {
            style,
            raw: raw.into(),
            body,
            trailing_blanks: 0,
        }
    }

    pub(crate) fn with_trailing_blanks(mut self, count: usize) -> Self {
        self.trailing_blanks = count;
        self
    }

    /// Creates a scalar for `text`, plain when that reads back as the same string,
    /// double-quoted otherwise.
    pub fn string(text: &str) -> Self {
        if is_plain_safe(text) && resolve_plain(text) == ScalarKind::String {
            Scalar::from_source(ScalarStyle::Plain, text, Vec::new())
        } else {
            Scalar::from_source(ScalarStyle::DoubleQuoted, double_quote(text), Vec::new())
        }
    }

    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    /// Source text as written on the owning line.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn kind(&self) -> ScalarKind {
        match self.style {
            ScalarStyle::Plain => resolve_plain(&self.raw),
            _ => ScalarKind::String,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == ScalarKind::Null
    }

    /// The scalar's textual form: quotes removed, escapes resolved.
    pub fn text(&self) -> String {
        match self.style {
            ScalarStyle::Plain => self.raw.clone(),
            ScalarStyle::SingleQuoted => unquote_single(&self.raw),
            ScalarStyle::DoubleQuoted => unquote_double(&self.raw),
            ScalarStyle::Literal | ScalarStyle::Folded => {
                block_text(self.style, &self.raw, &self.body, self.trailing_blanks)
            }
        }
    }

    /// Returns a scalar holding `text`, keeping this scalar's quoting where possible.
    pub fn replaced(&self, text: &str) -> Scalar {
        match self.style {
            ScalarStyle::DoubleQuoted => {
                Scalar::from_source(ScalarStyle::DoubleQuoted, double_quote(text), Vec::new())
            }
            ScalarStyle::SingleQuoted if !text.contains(['\n', '\r']) => {
                Scalar::from_source(ScalarStyle::SingleQuoted, single_quote(text), Vec::new())
            }
            ScalarStyle::Plain if is_plain_safe(text) => {
                // A null leaf takes a string, the same as a newly inserted key.
                let keep_plain = !matches!(self.kind(), ScalarKind::String | ScalarKind::Null);
                if keep_plain || resolve_plain(text) == ScalarKind::String {
                    Scalar::from_source(ScalarStyle::Plain, text, Vec::new())
                } else {
                    Scalar::from_source(ScalarStyle::DoubleQuoted, double_quote(text), Vec::new())
                }
            }
            _ => Scalar::string(text),
        }
    }
}

/// Map is an ordered mapping from string keys to values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    indent: usize,
    entries: Vec<MapEntry>,
    /// Written as `{}` in the source.
    flow: bool,
}

/// MapEntry is one `key: value` pair together with its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    key: String,
    key_raw: String,
    /// Whitespace between the colon and an inline value.
    sep: String,
    value: Value,
}

impl MapEntry {
    pub(crate) fn new(key: String, key_raw: String, sep: String, value: Value) -> Self {
        MapEntry {
            key,
            key_raw,
            sep,
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn key_raw(&self) -> &str {
        &self.key_raw
    }

    pub fn sep(&self) -> &str {
        &self.sep
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub(crate) fn assign(&mut self, scalar: Scalar) {
        if self.sep.is_empty() && !scalar.raw().is_empty() {
            self.sep = " ".to_string();
        }
        self.value = Value::Scalar(scalar);
    }
}

impl Map {
    /// Creates an empty block map whose keys sit at `indent`.
    pub fn new(indent: usize) -> Self {
        Map {
            indent,
            entries: Vec::new(),
            flow: false,
        }
    }

    pub(crate) fn flow_empty(indent: usize) -> Self {
        Map {
            indent,
            entries: Vec::new(),
            flow: true,
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn is_flow(&self) -> bool {
        self.flow
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entry_mut(key).map(|e| &mut e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut MapEntry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Appends a new key at the end of the map. An empty `{}` map becomes a block map.
    pub fn insert(&mut self, key: &str, value: Value) {
        let key_raw = if is_plain_safe(key) {
            key.to_string()
        } else {
            double_quote(key)
        };
        let sep = match &value {
            Value::Scalar(s) if s.raw().is_empty() => String::new(),
            Value::Scalar(_) => " ".to_string(),
            _ => String::new(),
        };
        self.flow = false;
        self.entries.push(MapEntry::new(key.to_string(), key_raw, sep, value));
    }

    pub(crate) fn push_entry(&mut self, entry: MapEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MapEntry> {
        self.entries.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }
}

/// List is an ordered sequence of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    indent: usize,
    items: Vec<Item>,
    flow: bool,
}

/// Item is one `- value` entry; `gap` is the whitespace after the dash when the value
/// starts on the dash line, empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    gap: String,
    value: Value,
}

impl Item {
    pub(crate) fn new(gap: String, value: Value) -> Self {
        Item { gap, value }
    }

    pub fn gap(&self) -> &str {
        &self.gap
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub(crate) fn assign(&mut self, scalar: Scalar) {
        if self.gap.is_empty() && !scalar.raw().is_empty() {
            self.gap = " ".to_string();
        }
        self.value = Value::Scalar(scalar);
    }
}

impl List {
    /// Creates an empty block list whose dashes sit at `indent`.
    pub fn new(indent: usize) -> Self {
        List {
            indent,
            items: Vec::new(),
            flow: false,
        }
    }

    pub(crate) fn flow_empty(indent: usize) -> Self {
        List {
            indent,
            items: Vec::new(),
            flow: true,
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn is_flow(&self) -> bool {
        self.flow
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index).map(|i| &i.value)
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    pub(crate) fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|i| &i.value)
    }
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Short name of the node's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Map(_) => "map",
            Value::List(_) => "list",
        }
    }
}

/// Resolves a plain scalar the way the YAML core schema does.
pub fn resolve_plain(text: &str) -> ScalarKind {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => ScalarKind::Null,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => ScalarKind::Bool,
        _ if INT_RE.is_match(text) => ScalarKind::Int,
        _ if FLOAT_RE.is_match(text) => ScalarKind::Float,
        _ => ScalarKind::String,
    }
}

/// Returns true if `text` can be written as a plain scalar and read back unchanged.
pub fn is_plain_safe(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if text.trim() != text || text.contains(['\n', '\r', '\t']) {
        return false;
    }
    if "[]{}#&*!|>'\"%@`,".contains(first) {
        return false;
    }
    if "-?:".contains(first) {
        let second = text[1..].chars().next();
        if second.is_none() || second == Some(' ') {
            return false;
        }
    }
    !(text.contains(": ") || text.contains(" #") || text.ends_with(':'))
}

fn double_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn unquote_single(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}

fn unquote_double(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('x') => push_hex(&mut out, &mut chars, 2),
            Some('u') => push_hex(&mut out, &mut chars, 4),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_hex(out: &mut String, chars: &mut std::str::Chars<'_>, width: usize) {
    let digits: String = chars.by_ref().take(width).collect();
    match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push_str(&digits),
    }
}

fn block_text(style: ScalarStyle, header: &str, body: &[String], trailing_blanks: usize) -> String {
    let indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .next()
        .unwrap_or(0);
    let lines: Vec<&str> = body
        .iter()
        .map(|l| {
            let leading = l.len() - l.trim_start_matches(' ').len();
            &l[leading.min(indent)..]
        })
        .collect();

    let mut text = match style {
        ScalarStyle::Folded => {
            let mut folded = String::new();
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    folded.push('\n');
                } else if i > 0 && !lines[i - 1].is_empty() {
                    folded.push(' ');
                }
                folded.push_str(line);
            }
            folded
        }
        _ => lines.join("\n"),
    };
    if header.contains('-') {
        return text;
    }
    if !text.is_empty() {
        text.push('\n');
    }
    if header.contains('+') {
        text.push_str(&"\n".repeat(trailing_blanks));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain() {
        assert_eq!(resolve_plain(""), ScalarKind::Null);
        assert_eq!(resolve_plain("~"), ScalarKind::Null);
        assert_eq!(resolve_plain("True"), ScalarKind::Bool);
        assert_eq!(resolve_plain("42"), ScalarKind::Int);
        assert_eq!(resolve_plain("0x1F"), ScalarKind::Int);
        assert_eq!(resolve_plain("1.5"), ScalarKind::Float);
        assert_eq!(resolve_plain(".inf"), ScalarKind::Float);
        assert_eq!(resolve_plain("1.2.3"), ScalarKind::String);
        assert_eq!(resolve_plain("yes"), ScalarKind::String);
    }

    #[test]
    fn test_scalar_text() {
        let s = Scalar::from_source(ScalarStyle::DoubleQuoted, r#""a\"b\n""#, vec![]);
        assert_eq!(s.text(), "a\"b\n");

        let s = Scalar::from_source(ScalarStyle::SingleQuoted, "'it''s'", vec![]);
        assert_eq!(s.text(), "it's");

        let s = Scalar::from_source(
            ScalarStyle::Literal,
            "|",
            vec!["  line one".into(), "  line two".into()],
        );
        assert_eq!(s.text(), "line one\nline two\n");

        let s = Scalar::from_source(
            ScalarStyle::Folded,
            ">-",
            vec!["  a".into(), "  b".into(), "".into(), "  c".into()],
        );
        assert_eq!(s.text(), "a b\nc");

        let s = Scalar::from_source(ScalarStyle::Literal, "|+", vec!["  keep".into()]).with_trailing_blanks(2);
        assert_eq!(s.text(), "keep\n\n\n");
        let s = Scalar::from_source(ScalarStyle::Literal, "|", vec!["  clip".into()]).with_trailing_blanks(2);
        assert_eq!(s.text(), "clip\n");
    }

    #[test]
    fn test_replaced_keeps_style() {
        let quoted = Scalar::from_source(ScalarStyle::DoubleQuoted, "\"2.3.1\"", vec![]);
        assert_eq!(quoted.replaced("2.4.0").raw(), "\"2.4.0\"");

        let single = Scalar::from_source(ScalarStyle::SingleQuoted, "'x'", vec![]);
        assert_eq!(single.replaced("it's").raw(), "'it''s'");

        let plain = Scalar::from_source(ScalarStyle::Plain, "1.2.3", vec![]);
        assert_eq!(plain.replaced("1.3.0").raw(), "1.3.0");
    }

    #[test]
    fn test_replaced_quotes_when_plain_would_change_type() {
        let plain = Scalar::from_source(ScalarStyle::Plain, "stable", vec![]);
        assert_eq!(plain.replaced("true").raw(), "\"true\"");
        assert_eq!(plain.replaced("a: b").raw(), "\"a: b\"");

        let number = Scalar::from_source(ScalarStyle::Plain, "1.0", vec![]);
        assert_eq!(number.replaced("1.1").raw(), "1.1");

        for null in [Scalar::null(), Scalar::from_source(ScalarStyle::Plain, "~", vec![])] {
            assert_eq!(null.replaced("1.10").raw(), "\"1.10\"");
            assert_eq!(null.replaced("v1.10").raw(), "v1.10");
        }
    }

    #[test]
    fn test_map_operations() {
        let mut map = Map::new(0);
        assert!(map.is_empty());

        map.insert("key", Value::Scalar(Scalar::string("value")));
        assert!(map.has("key"));
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("key").and_then(Value::as_scalar).map(Scalar::text),
            Some("value".to_string())
        );

        map.insert("app.kubernetes.io/name", Value::Scalar(Scalar::string("x")));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["key", "app.kubernetes.io/name"]);
    }

    #[test]
    fn test_plain_safety() {
        assert!(is_plain_safe("ghcr.io/example/app"));
        assert!(is_plain_safe("-1"));
        assert!(!is_plain_safe(""));
        assert!(!is_plain_safe("- a"));
        assert!(!is_plain_safe("*alias"));
        assert!(!is_plain_safe("a #b"));
        assert!(!is_plain_safe(" padded"));
    }
}
