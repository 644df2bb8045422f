//! File selection and writes.

use super::BumpError;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Default file patterns searched for `# bump:` directives.
pub const DEFAULT_SCAN_GLOBS: &str = "Chart.yaml,values*.yaml";

/// Writes `bytes` to `file` unless the file already holds exactly those bytes.
///
/// Returns whether the file was written.
pub fn write_if_changed(file: &Path, bytes: &[u8]) -> Result<bool, BumpError> {
    match std::fs::read(file) {
        Ok(existing) if existing == bytes => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BumpError::io(file, e)),
    }
    std::fs::write(file, bytes).map_err(|e| BumpError::io(file, e))?;
    Ok(true)
}

/// Expands a comma-separated list of file patterns relative to `dir`.
///
/// Patterns support `*` and `?` within one path component; components are separated by
/// `/`. Only regular files are returned, sorted and without duplicates.
pub fn expand_scan_globs(dir: &Path, globs: &str) -> Result<Vec<PathBuf>, BumpError> {
    let mut out = Vec::new();
    for pattern in globs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if pattern.starts_with('/') || pattern.split('/').any(|c| c == "..") {
            return Err(BumpError::Glob {
                pattern: pattern.to_string(),
                reason: "patterns must stay inside the chart directory".to_string(),
            });
        }
        let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty() && *c != ".").collect();
        expand(dir, &components, pattern, &mut out)?;
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn expand(dir: &Path, components: &[&str], pattern: &str, out: &mut Vec<PathBuf>) -> Result<(), BumpError> {
    let Some((first, rest)) = components.split_first() else {
        return Ok(());
    };

    if !has_wildcard(first) {
        let next = dir.join(first);
        visit(&next, rest, pattern, out)?;
        return Ok(());
    }

    let re = component_regex(first).map_err(|e| BumpError::Glob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(BumpError::io(dir, e)),
    };
    for entry in entries {
        let entry = entry.map_err(|e| BumpError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        // Hidden entries only match patterns that start with a dot.
        if name.starts_with('.') && !first.starts_with('.') {
            continue;
        }
        if re.is_match(name) {
            visit(&entry.path(), rest, pattern, out)?;
        }
    }
    Ok(())
}

fn visit(path: &Path, rest: &[&str], pattern: &str, out: &mut Vec<PathBuf>) -> Result<(), BumpError> {
    let Ok(metadata) = std::fs::metadata(path) else {
        return Ok(());
    };
    if rest.is_empty() {
        if metadata.is_file() {
            out.push(path.to_path_buf());
        }
        Ok(())
    } else if metadata.is_dir() {
        expand(path, rest, pattern, out)
    } else {
        Ok(())
    }
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?'])
}

/// `*` matches any run of characters and `?` one character.
fn component_regex(component: &str) -> Result<Regex, regex::Error> {
    let mut re = String::from("^");
    for c in component.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(dir: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("values.yaml");
        assert!(write_if_changed(&file, b"a: 1\n").unwrap());
        assert!(!write_if_changed(&file, b"a: 1\n").unwrap());
        assert!(write_if_changed(&file, b"a: 2\n").unwrap());
        assert_eq!(std::fs::read(&file).unwrap(), b"a: 2\n");

        let missing_dir = dir.path().join("nope").join("values.yaml");
        assert!(matches!(write_if_changed(&missing_dir, b"x"), Err(BumpError::Io { .. })));
    }

    #[test]
    fn test_expand_scan_globs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in ["Chart.yaml", "values.yaml", "values-prod.yaml", "values.yml", ".values-hidden.yaml", "README.md"] {
            std::fs::write(root.join(file), "").unwrap();
        }
        std::fs::create_dir_all(root.join("values-dir.yaml")).unwrap();
        std::fs::create_dir_all(root.join("templates")).unwrap();
        std::fs::write(root.join("templates/deployment.yaml"), "").unwrap();

        let files = expand_scan_globs(root, DEFAULT_SCAN_GLOBS).unwrap();
        assert_eq!(names(root, &files), vec!["Chart.yaml", "values-prod.yaml", "values.yaml"]);

        let files = expand_scan_globs(root, " values.y?l , templates/*.yaml,Chart.yaml,Chart.yaml,missing.yaml,").unwrap();
        assert_eq!(
            names(root, &files),
            vec!["Chart.yaml", "templates/deployment.yaml", "values.yml"]
        );

        let files = expand_scan_globs(root, ".values-*").unwrap();
        assert_eq!(names(root, &files), vec![".values-hidden.yaml"]);

        let files = expand_scan_globs(root, "*.yaml").unwrap();
        assert_eq!(names(root, &files), vec!["Chart.yaml", "values-prod.yaml", "values.yaml"]);

        assert!(expand_scan_globs(root, "").unwrap().is_empty());
        assert!(matches!(expand_scan_globs(root, "../*.yaml"), Err(BumpError::Glob { .. })));
    }

    #[test]
    fn test_component_regex() {
        let re = component_regex("values*.yaml").unwrap();
        assert!(re.is_match("values.yaml"));
        assert!(re.is_match("values-prod.yaml"));
        assert!(!re.is_match("myvalues.yaml"));
        assert!(component_regex("*").unwrap().is_match("visible"));
        assert!(component_regex("a+b(1)").unwrap().is_match("a+b(1)"));
    }
}
