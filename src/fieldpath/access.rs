//! Reading and writing scalar leaves of a value tree by address.

use super::{Path, PathElement, PathError};
use crate::value::{Item, Scalar, Value};

fn prefix(path: &Path, len: usize) -> Path {
    Path::from_elements(path.as_slice()[..len].to_vec())
}

fn expected_for(element: &PathElement) -> &'static str {
    match element {
        PathElement::FieldName(_) => "map",
        PathElement::Index(_) => "list",
    }
}

/// Navigates `root` along `path`.
///
/// A missing key or an out-of-range index yields `Ok(None)`, as does stepping through a
/// null scalar (`key:` with nothing after it). A node of the wrong shape for a step is a
/// `TypeMismatch` reported at that node's path.
pub fn get<'a>(root: &'a Value, path: &Path) -> Result<Option<&'a Value>, PathError> {
    if path.is_empty() {
        return Err(PathError::root_target());
    }

    let mut node = root;
    for (depth, element) in path.iter().enumerate() {
        let next = match (element, node) {
            (PathElement::FieldName(name), Value::Map(map)) => map.get(name),
            (PathElement::Index(index), Value::List(list)) => list.get(*index),
            (_, Value::Scalar(scalar)) if scalar.is_null() => None,
            (element, other) => {
                return Err(PathError::type_mismatch(
                    prefix(path, depth),
                    expected_for(element),
                    other.kind_name(),
                ))
            }
        };
        match next {
            Some(value) => node = value,
            None => return Ok(None),
        }
    }
    Ok(Some(node))
}

/// Returns the textual form of the scalar at `path`, or `None` when the leaf is absent
/// or null. A container at `path` is a `TypeMismatch`.
pub fn get_string(root: &Value, path: &Path) -> Result<Option<String>, PathError> {
    match get(root, path)? {
        None => Ok(None),
        Some(Value::Scalar(scalar)) if scalar.is_null() => Ok(None),
        Some(Value::Scalar(scalar)) => Ok(Some(scalar.text())),
        Some(other) => Err(PathError::type_mismatch(path.clone(), "scalar", other.kind_name())),
    }
}

/// Writes `text` to the scalar leaf at `path` and reports whether anything changed.
///
/// Every step but the last must already exist. The last step may name a key that is not
/// present yet; it is appended to its map. List indices must be in range.
pub fn set_string(root: &mut Value, path: &Path, text: &str) -> Result<bool, PathError> {
    let Some((leaf, parents)) = path.as_slice().split_last() else {
        return Err(PathError::root_target());
    };

    let mut node = root;
    for (depth, element) in parents.iter().enumerate() {
        node = match (element, node) {
            (PathElement::FieldName(name), Value::Map(map)) => map
                .get_mut(name)
                .ok_or_else(|| PathError::not_found(prefix(path, depth + 1)))?,
            (PathElement::Index(index), Value::List(list)) => list
                .item_mut(*index)
                .map(Item::value_mut)
                .ok_or_else(|| PathError::not_found(prefix(path, depth + 1)))?,
            (_, Value::Scalar(scalar)) if scalar.is_null() => {
                return Err(PathError::not_found(prefix(path, depth + 1)))
            }
            (element, other) => {
                return Err(PathError::type_mismatch(
                    prefix(path, depth),
                    expected_for(element),
                    other.kind_name(),
                ))
            }
        };
    }

    let parent_path = prefix(path, parents.len());
    match (leaf, node) {
        (PathElement::FieldName(name), Value::Map(map)) => match map.entry_mut(name) {
            Some(entry) => {
                let replacement = replace_scalar(entry.value(), path, text)?;
                Ok(replacement.map(|scalar| entry.assign(scalar)).is_some())
            }
            None => {
                map.insert(name, Value::Scalar(Scalar::string(text)));
                Ok(true)
            }
        },
        (PathElement::Index(index), Value::List(list)) => {
            let item = list
                .item_mut(*index)
                .ok_or_else(|| PathError::not_found(path.clone()))?;
            let replacement = replace_scalar(item.value(), path, text)?;
            Ok(replacement.map(|scalar| item.assign(scalar)).is_some())
        }
        (_, Value::Scalar(scalar)) if scalar.is_null() => Err(PathError::not_found(parent_path)),
        (element, other) => Err(PathError::type_mismatch(
            parent_path,
            expected_for(element),
            other.kind_name(),
        )),
    }
}

/// Returns the scalar that should replace `current`, or `None` when it already reads as `text`.
fn replace_scalar(current: &Value, path: &Path, text: &str) -> Result<Option<Scalar>, PathError> {
    match current {
        Value::Scalar(scalar) if scalar.text() == text => Ok(None),
        Value::Scalar(scalar) => Ok(Some(scalar.replaced(text))),
        other => Err(PathError::type_mismatch(path.clone(), "scalar", other.kind_name())),
    }
}
