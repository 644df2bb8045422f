//! Image tag and digest updates driven by `# bump:` directives.

use super::{BumpError, Change, FileUpdate};
use crate::directives::{scan_str, Directive, Strategy};
use crate::document::{Document, ParseError};
use crate::fieldpath::PathElement;
use crate::resolve::{resolve_tag, DigestResolver, TagLister, TagQuery};
use std::path::Path;
use tracing::{debug, info, Span};

/// Registry collaborators used by the image pipeline.
#[derive(Clone, Copy)]
pub struct Resolvers<'a> {
    pub tags: &'a dyn TagLister,
    pub digests: &'a dyn DigestResolver,
}

/// Resolves the new value of each directive and writes it into `doc`.
///
/// Directives run in line order, so a `digest` directive below a `tag` directive of the
/// same image sees the freshly selected tag.
pub fn apply_directives(
    doc: &mut Document,
    directives: &[Directive],
    resolvers: Resolvers<'_>,
    span: &Span,
) -> Result<Vec<Change>, BumpError> {
    let mut changes = Vec::new();
    for directive in directives {
        let resolve_err = |source| BumpError::Resolve {
            file: directive.file.clone(),
            line: directive.line,
            source,
        };
        let path_err = |source| BumpError::Path {
            file: directive.file.clone(),
            line: directive.line,
            source,
        };

        let new_value = match directive.strategy {
            Strategy::Digest => {
                let tag_path = directive.address.parent().with(PathElement::field_name("tag"));
                let tag = match doc.get_string_at(&tag_path).map_err(path_err)? {
                    Some(tag) if !tag.trim().is_empty() => tag,
                    _ => {
                        return Err(BumpError::MissingDigestTag {
                            file: directive.file.clone(),
                            line: directive.line,
                            address: tag_path,
                        })
                    }
                };
                resolvers
                    .digests
                    .resolve_digest(&directive.image, tag.trim(), directive.platform.as_deref())
                    .map_err(resolve_err)?
            }
            _ => resolve_tag(resolvers.tags, &TagQuery::from_directive(directive), span).map_err(resolve_err)?,
        };

        let old_value = doc.get_string_at(&directive.address).map_err(path_err)?.unwrap_or_default();
        if doc.set_string_at(&directive.address, &new_value).map_err(path_err)? {
            info!(
                parent: span,
                file = %directive.file.display(),
                line = directive.line,
                address = %directive.address,
                from = %old_value,
                to = %new_value,
                "updated image reference"
            );
            changes.push(Change::Image {
                line: directive.target_line,
                address: directive.address.clone(),
                image: directive.image.clone(),
                from: old_value,
                to: new_value,
            });
        } else {
            debug!(parent: span, address = %directive.address, value = %new_value, "already up to date");
        }
    }
    Ok(changes)
}

/// Scans one file for directives and applies them.
///
/// The returned update carries the rendered bytes; nothing is written.
pub fn update_images_in_file(file: &Path, resolvers: Resolvers<'_>, span: &Span) -> Result<FileUpdate, BumpError> {
    let original = std::fs::read(file).map_err(|e| BumpError::io(file, e))?;
    let text = std::str::from_utf8(&original).map_err(|e| BumpError::parse(file, ParseError::from(e)))?;

    let directives = scan_str(file, text, span)?;
    debug!(parent: span, file = %file.display(), count = directives.len(), "scanned directives");
    if directives.is_empty() {
        return Ok(FileUpdate::unchanged(file, original));
    }

    let mut doc = Document::parse_str(text).map_err(|e| BumpError::parse(file, e))?;
    let changes = apply_directives(&mut doc, &directives, resolvers, span)?;
    if changes.is_empty() {
        return Ok(FileUpdate::unchanged(file, original));
    }
    Ok(FileUpdate {
        file: file.to_path_buf(),
        output: doc.to_bytes(),
        original,
        changes,
    })
}
