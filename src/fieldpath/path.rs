//! Path element and path types.

use super::error::PathError;
use std::fmt;
use std::str::FromStr;

/// PathElement represents one level of path navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// Field name for map keys.
    FieldName(String),
    /// Zero-based index into a list.
    Index(usize),
}

impl PathElement {
    /// Creates a new field name path element.
    pub fn field_name(name: impl Into<String>) -> Self {
        PathElement::FieldName(name.into())
    }

    /// Creates a new index path element.
    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// Returns true if this is a field name element.
    pub fn is_field_name(&self) -> bool {
        matches!(self, PathElement::FieldName(_))
    }

    /// Returns the field name if this is a field name element.
    pub fn as_field_name(&self) -> Option<&str> {
        match self {
            PathElement::FieldName(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if the element can be written in address syntax.
    pub fn is_addressable(&self) -> bool {
        match self {
            PathElement::FieldName(name) => is_field_name(name),
            PathElement::Index(_) => true,
        }
    }
}

/// Path represents a complete address of a node, written `$.a.b[0].c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Creates a new empty path (the document root, `$`).
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Path { elements }
    }

    /// Parses an address string.
    ///
    /// Grammar: `$` followed by any number of `.name` (name made of ASCII letters,
    /// digits, `_` and `-`) or `[n]` steps with no separator between them.
    pub fn parse(address: &str) -> Result<Path, PathError> {
        let invalid = |reason: String| PathError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        let Some(mut rest) = address.strip_prefix('$') else {
            return Err(invalid("address must start with '$'".to_string()));
        };

        let mut elements = Vec::new();
        while let Some(c) = rest.chars().next() {
            let offset = address.len() - rest.len();
            match c {
                '.' => {
                    let name_len = rest[1..]
                        .find(|c: char| !is_field_char(c))
                        .unwrap_or(rest.len() - 1);
                    if name_len == 0 {
                        return Err(invalid(format!("empty field name at offset {}", offset)));
                    }
                    elements.push(PathElement::FieldName(rest[1..1 + name_len].to_string()));
                    rest = &rest[1 + name_len..];
                }
                '[' => {
                    let Some(close) = rest.find(']') else {
                        return Err(invalid(format!("unclosed index at offset {}", offset)));
                    };
                    let digits = &rest[1..close];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(invalid(format!("invalid index {:?} at offset {}", digits, offset)));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|e| invalid(format!("invalid index {:?}: {}", digits, e)))?;
                    elements.push(PathElement::Index(index));
                    rest = &rest[close + 1..];
                }
                other => {
                    return Err(invalid(format!("unexpected {:?} at offset {}", other, offset)));
                }
            }
        }
        Ok(Path { elements })
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.elements.iter()
    }

    /// Appends a path element.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// Removes and returns the last path element.
    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Returns the last path element.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut new_path = self.clone();
        new_path.push(element);
        new_path
    }

    /// Returns the path without its last element.
    pub fn parent(&self) -> Path {
        let mut parent = self.clone();
        parent.pop();
        parent
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElement] {
        &self.elements
    }

    /// Returns true if every element can be written in address syntax.
    pub fn is_addressable(&self) -> bool {
        self.elements.iter().all(PathElement::is_addressable)
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_field_char)
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Path {
    type Item = PathElement;
    type IntoIter = std::vec::IntoIter<PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::FieldName(name) => write!(f, ".{}", name),
            PathElement::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
