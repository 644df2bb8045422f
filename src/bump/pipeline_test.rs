//! End-to-end runs of the bump pipelines against fixture registries and indexes.

#[cfg(test)]
mod tests {
    use crate::bump::*;
    use crate::directives::scan_str;
    use crate::document::Document;
    use crate::fieldpath::Path;
    use crate::resolve::{GitHistory, ResolveError, StaticIndex, StaticRegistry};
    use crate::version::ChangeLevel;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tracing::Span;

    const REGISTRY: &str = r#"
images:
  ghcr.io/example/app:
    tags: ["2.3.1", "2.4.0", "3.0.0", "v2.4.0", "2.5.0-rc.1"]
    platforms:
      linux/arm64:
        "2.4.0": sha256:new-arm
  docker.io/library/redis:
    tags: ["7.2.4-alpine", "7.2.5-alpine", "7.2.5", "8.0.0-rc.1-alpine"]
"#;

    const VALUES: &str = r#"image:
  repository: ghcr.io/example/app
  # bump: image=ghcr.io/example/app strategy=semver constraint="^2"
  tag: "2.3.1"
  # bump: image=ghcr.io/example/app strategy=digest platform=linux/arm64
  digest: sha256:old
sidecar:
  # bump: image=docker.io/library/redis strategy=regex tagRegex="^(\d+\.\d+\.\d+)-alpine$"
  tag: 7.2.4-alpine # pinned
"#;

    const CHART: &str = r#"apiVersion: v2
name: app
# bump: image=ghcr.io/example/app constraint="^2"
appVersion: "2.3.1"
version: 0.1.0
dependencies:
  - name: redis
    version: "^19.0.0" # range
    repository: https://charts.example.com
  - name: local
    version: 0.1.0
    repository: file://../local
"#;

    const INDEX: &str = r#"
repositories:
  https://charts.example.com:
    entries:
      redis:
        - version: 19.0.0
        - version: 19.6.1
        - version: 20.0.0
"#;

    fn registry() -> StaticRegistry {
        StaticRegistry::from_yaml(REGISTRY).unwrap()
    }

    fn resolvers(registry: &StaticRegistry) -> Resolvers<'_> {
        Resolvers {
            tags: registry,
            digests: registry,
        }
    }

    fn apply(source: &str) -> Result<(Vec<Change>, String), BumpError> {
        let registry = registry();
        let directives = scan_str("values.yaml", source, &Span::none())?;
        let mut doc = Document::parse_str(source).unwrap();
        let changes = apply_directives(&mut doc, &directives, resolvers(&registry), &Span::none())?;
        Ok((changes, doc.render()))
    }

    fn image_change(line: usize, address: &str, image: &str, from: &str, to: &str) -> Change {
        Change::Image {
            line,
            address: Path::parse(address).unwrap(),
            image: image.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_apply_directives() {
        let (changes, out) = apply(VALUES).unwrap();
        assert_eq!(
            out,
            r#"image:
  repository: ghcr.io/example/app
  # bump: image=ghcr.io/example/app strategy=semver constraint="^2"
  tag: "2.4.0"
  # bump: image=ghcr.io/example/app strategy=digest platform=linux/arm64
  digest: sha256:new-arm
sidecar:
  # bump: image=docker.io/library/redis strategy=regex tagRegex="^(\d+\.\d+\.\d+)-alpine$"
  tag: 7.2.5-alpine # pinned
"#
        );
        assert_eq!(
            changes,
            vec![
                image_change(4, "$.image.tag", "ghcr.io/example/app", "2.3.1", "2.4.0"),
                image_change(6, "$.image.digest", "ghcr.io/example/app", "sha256:old", "sha256:new-arm"),
                image_change(9, "$.sidecar.tag", "docker.io/library/redis", "7.2.4-alpine", "7.2.5-alpine"),
            ]
        );
    }

    #[test]
    fn test_apply_directives_up_to_date() {
        let source = "# bump: image=ghcr.io/example/app constraint=^2\ntag: 2.4.0\n";
        let (changes, out) = apply(source).unwrap();
        assert!(changes.is_empty());
        assert_eq!(out, source);
    }

    #[test]
    fn test_apply_directives_errors() {
        let source = "image:\n  # bump: image=ghcr.io/example/app strategy=digest\n  digest: sha256:old\n";
        match apply(source) {
            Err(BumpError::MissingDigestTag { line, address, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(address.to_string(), "$.image.tag");
            }
            other => panic!("unexpected {:?}", other),
        }

        let source = "image:\n  tag: 2.3.1\n  # bump: image=ghcr.io/example/app strategy=digest\n  digest: old\n";
        let err = apply(source).unwrap_err();
        assert!(matches!(err, BumpError::Resolve { line: 3, source: ResolveError::Collaborator { .. }, .. }));

        let source = "a: 1\n# bump: image=ghcr.io/example/app constraint=^9\ntag: 2.3.1\n";
        let err = apply(source).unwrap_err();
        assert!(matches!(err, BumpError::Resolve { line: 2, source: ResolveError::ConstraintViolation { .. }, .. }));
        assert!(err.to_string().starts_with("values.yaml:2: "), "{}", err);

        let source = "# bump: image=ghcr.io/example/app strategy=latest\ntag: 2.3.1\n";
        assert!(matches!(apply(source), Err(BumpError::Directive(_))));
    }

    #[test]
    fn test_update_images_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let file = dir.path().join("values.yaml");
        std::fs::write(&file, VALUES).unwrap();

        let update = update_images_in_file(&file, resolvers(&registry), &Span::none()).unwrap();
        assert!(update.changed());
        assert_eq!(update.changes.len(), 3);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), VALUES);
        assert!(update.write().unwrap());
        assert!(!update.write().unwrap());
        assert!(std::fs::read_to_string(&file).unwrap().contains("tag: \"2.4.0\""));

        let plain = dir.path().join("plain.yaml");
        std::fs::write(&plain, "a: 1\n").unwrap();
        let update = update_images_in_file(&plain, resolvers(&registry), &Span::none()).unwrap();
        assert!(!update.changed());
        assert!(!update.write().unwrap());
    }

    #[test]
    fn test_update_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Chart.yaml"), CHART).unwrap();
        let index = StaticIndex::from_yaml(INDEX).unwrap();

        let update = update_dependencies(dir.path(), &index, &Span::none()).unwrap();
        assert_eq!(
            update.changes,
            vec![Change::Dependency {
                index: 0,
                name: "redis".to_string(),
                from: "^19.0.0".to_string(),
                to: "19.6.1".to_string(),
            }]
        );
        assert_eq!(
            String::from_utf8(update.output.clone()).unwrap(),
            CHART.replace("\"^19.0.0\" # range", "\"19.6.1\" # range")
        );
        assert_eq!(dependency_version_path(3).to_string(), "$.dependencies[3].version");
    }

    #[test]
    fn test_bump_chart() {
        let base = CHART.as_bytes();
        let cur = CHART.replace("appVersion: \"2.3.1\"", "appVersion: \"2.4.0\"");
        let bump = bump_chart(base, cur.as_bytes(), &PathBuf::from("Chart.yaml"), &Span::none()).unwrap();
        assert_eq!(bump.level, ChangeLevel::Minor);
        assert!(bump.changed);
        assert_eq!(bump.old_version.as_deref(), Some("0.1.0"));
        assert_eq!(bump.new_version.as_deref(), Some("0.2.0"));
        assert_eq!(
            String::from_utf8(bump.output).unwrap(),
            cur.replace("version: 0.1.0\ndependencies", "version: 0.2.0\ndependencies")
        );

        let bump = bump_chart(base, base, &PathBuf::from("Chart.yaml"), &Span::none()).unwrap();
        assert_eq!(bump.level, ChangeLevel::NoChange);
        assert!(!bump.changed);
        assert_eq!(bump.output, base);

        let err = bump_chart(base, b"name: x\n", &PathBuf::from("Chart.yaml"), &Span::none()).unwrap_err();
        assert_eq!(err.to_string(), "Chart.yaml: Chart.yaml missing version");
    }

    fn options(chart: PathBuf, base: BaseSource, write: bool) -> BumpOptions {
        BumpOptions {
            chart,
            base,
            write,
            update_images: true,
            update_deps: true,
            scan_globs: DEFAULT_SCAN_GLOBS.to_string(),
        }
    }

    #[test]
    fn test_run_writes_everything() {
        let base_dir = tempfile::tempdir().unwrap();
        let base = base_dir.path().join("Chart.yaml");
        std::fs::write(&base, CHART).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("Chart.yaml");
        let values = dir.path().join("values.yaml");
        std::fs::write(&chart, CHART).unwrap();
        std::fs::write(&values, VALUES).unwrap();

        let registry = registry();
        let index = StaticIndex::from_yaml(INDEX).unwrap();
        let collaborators = Collaborators {
            tags: Some(&registry),
            digests: Some(&registry),
            index: Some(&index),
            history: None,
        };
        let report = run(&options(chart.clone(), BaseSource::File(base), true), collaborators, &Span::none()).unwrap();

        assert!(report.changed());
        assert_eq!(report.written, vec![chart.clone(), values.clone()]);
        assert_eq!(report.updates.len(), 3);
        assert_eq!(report.chart.level, ChangeLevel::Minor);
        assert_eq!(
            std::fs::read_to_string(&chart).unwrap(),
            CHART
                .replace("appVersion: \"2.3.1\"", "appVersion: \"2.4.0\"")
                .replace("version: 0.1.0\ndependencies", "version: 0.2.0\ndependencies")
                .replace("\"^19.0.0\" # range", "\"19.6.1\" # range")
        );
        assert!(std::fs::read_to_string(&values).unwrap().contains("tag: 7.2.5-alpine # pinned"));
    }

    #[test]
    fn test_run_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("Chart.yaml");
        let base = dir.path().join("Chart.base.yaml");
        std::fs::write(&chart, CHART).unwrap();
        std::fs::write(&base, CHART.replace("\"2.3.1\"", "\"2.2.0\"")).unwrap();

        let report = run(
            &options(chart.clone(), BaseSource::File(base), false),
            Collaborators::default(),
            &Span::none(),
        )
        .unwrap();
        assert!(!report.changed());
        assert!(report.updates.is_empty());
        assert_eq!(report.chart.new_version.as_deref(), Some("0.2.0"));
        assert_eq!(std::fs::read_to_string(&chart).unwrap(), CHART);
    }

    #[test]
    fn test_run_missing_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("Chart.yaml");
        std::fs::write(&chart, CHART).unwrap();

        let err = run(
            &options(chart.clone(), BaseSource::File(chart.clone()), true),
            Collaborators::default(),
            &Span::none(),
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::MissingCollaborator(_)));

        let base = BaseSource::Revision {
            revision: "HEAD".to_string(),
            path: "Chart.yaml".to_string(),
        };
        let err = run(&options(chart, base, false), Collaborators::default(), &Span::none()).unwrap_err();
        assert!(matches!(err, BumpError::MissingCollaborator(_)));
    }

    #[test]
    fn test_run_with_git_base() {
        use git2::{Repository, Signature};

        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let chart = dir.path().join("Chart.yaml");
        std::fs::write(&chart, "name: app\nversion: 1.4.2\nappVersion: 1.0.0\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("Chart.yaml")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Chart Bumper", "bumper@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[]).unwrap();

        std::fs::write(&chart, "name: app\nversion: 1.4.2\nappVersion: 1.0.1\n").unwrap();

        let history = GitHistory::open(dir.path(), &Span::none()).unwrap();
        let collaborators = Collaborators {
            history: Some(&history),
            ..Default::default()
        };
        let base = BaseSource::Revision {
            revision: "HEAD".to_string(),
            path: "Chart.yaml".to_string(),
        };
        let mut opts = options(chart.clone(), base, true);
        opts.update_images = false;
        opts.update_deps = false;

        let report = run(&opts, collaborators, &Span::none()).unwrap();
        assert_eq!(report.chart.level, ChangeLevel::Patch);
        assert_eq!(report.written, vec![chart.clone()]);
        assert_eq!(
            std::fs::read_to_string(&chart).unwrap(),
            "name: app\nversion: 1.4.3\nappVersion: 1.0.1\n"
        );
    }
}
