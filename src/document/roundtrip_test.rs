//! Round-trip and in-place edit scenarios for documents.

#[cfg(test)]
mod tests {
    use crate::document::{Document, ParseError};
    use crate::fieldpath::PathError;
    use crate::value::ScalarStyle;
    use pretty_assertions::assert_eq;

    const VALUES: &str = r#"# Default values for web.
# This is a YAML-formatted file.

replicaCount: 1

image:
  repository: ghcr.io/example/app   # upstream
  # bump: image=ghcr.io/example/app strategy=semver
  tag: "2.3.1"
  pullPolicy: IfNotPresent

imagePullSecrets: []
podAnnotations: {}
nameOverride: ''

labels:
  "app.kubernetes.io/name": web
  'team': platform

service:
  type: ClusterIP
  port: 80

ingress:
  enabled: false
  hosts:
    - host: chart-example.local
      paths:
        - path: /
          pathType: ImplementationSpecific
  tls:
  - secretName: example-tls
    hosts:
    - chart-example.local

sidecars:
  -
    name: logger
    image: busybox:1.36
  - - nested
    - list

config: |
  server.port=8080

  # not a comment, part of the body
  log.level=info

notes: >-
  folded text
  continues here

empty:
tilde: ~
resources: {}   # set by operators
# trailing comment
"#;

    fn roundtrip(text: &str) {
        let doc = Document::parse_str(text).unwrap();
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn test_unmodified_roundtrip() {
        roundtrip(VALUES);
        roundtrip("a: 1");
        roundtrip("a: 1\n\n\n");
        roundtrip("  indented:\n    root: true\n");
        roundtrip("- a\n- b\n");
        roundtrip("---\n# chart\nname: x\n");
        roundtrip("key:   # comment only\n  child: 1\n");
        roundtrip("list:\n- \n-   spaced\n");
        roundtrip("a: |+\n  keep\n\nb: 1\n");
        roundtrip("crlf: yes\r\nnested:\r\n  - x\r\n");
    }

    #[test]
    fn test_reads() {
        let doc = Document::parse_str(VALUES).unwrap();
        let get = |address: &str| doc.get_string(address).unwrap();

        assert_eq!(get("$.replicaCount"), Some("1".to_string()));
        assert_eq!(get("$.image.tag"), Some("2.3.1".to_string()));
        assert_eq!(get("$.image.repository"), Some("ghcr.io/example/app".to_string()));
        assert_eq!(get("$.nameOverride"), Some(String::new()));
        assert_eq!(get("$.labels.team"), Some("platform".to_string()));
        assert_eq!(get("$.ingress.hosts[0].host"), Some("chart-example.local".to_string()));
        assert_eq!(get("$.ingress.hosts[0].paths[0].pathType"), Some("ImplementationSpecific".to_string()));
        assert_eq!(get("$.ingress.tls[0].hosts[0]"), Some("chart-example.local".to_string()));
        assert_eq!(get("$.sidecars[0].image"), Some("busybox:1.36".to_string()));
        assert_eq!(get("$.sidecars[1][1]"), Some("list".to_string()));
        assert_eq!(
            get("$.config"),
            Some("server.port=8080\n\n# not a comment, part of the body\nlog.level=info\n".to_string())
        );
        assert_eq!(get("$.notes"), Some("folded text continues here".to_string()));
        assert_eq!(get("$.empty"), None);
        assert_eq!(get("$.tilde"), None);
        assert_eq!(get("$.image.digest"), None);
        assert_eq!(get("$.ingress.hosts[3].host"), None);

        let comments = doc.comments();
        let path = |a: &str| crate::fieldpath::Path::parse(a).unwrap();
        assert_eq!(
            comments.before(&path("$.image.tag")),
            &["  # bump: image=ghcr.io/example/app strategy=semver".to_string()]
        );
        assert_eq!(comments.inline(&path("$.image.repository")), Some("   # upstream"));
        assert_eq!(comments.inline(&path("$.resources")), Some("   # set by operators"));
        assert_eq!(comments.foot(), &["# trailing comment".to_string()]);
        let tag = comments.get(&path("$.image.tag")).unwrap();
        assert_eq!(tag.inline, None);
        assert_eq!(tag.before.len(), 1);
        assert_eq!(comments.get(&path("$.image.pullPolicy")), None);
    }

    #[test]
    fn test_tree_shape() {
        let doc = Document::parse_str(VALUES).unwrap();
        assert!(doc.root().is_map());

        let image = doc.get("$.image").unwrap().unwrap();
        assert!(image.is_map() && !image.is_list() && !image.is_scalar());
        let tag = doc.get("$.image.tag").unwrap().unwrap();
        assert!(tag.is_scalar());
        assert_eq!(tag.as_scalar().unwrap().style(), ScalarStyle::DoubleQuoted);
        assert_eq!(
            doc.get("$.config").unwrap().unwrap().as_scalar().unwrap().style(),
            ScalarStyle::Literal
        );

        let hosts = doc.get("$.ingress.tls[0].hosts").unwrap().unwrap();
        assert!(hosts.is_list());
        assert_eq!(hosts.as_list().unwrap().len(), 1);
        assert!(image.as_list().is_none());

        let labels = doc.get("$.labels").unwrap().unwrap().as_map().unwrap();
        let raw: Vec<(&str, &str)> = labels.entries().map(|e| (e.key(), e.key_raw())).collect();
        assert_eq!(
            raw,
            vec![
                ("app.kubernetes.io/name", "\"app.kubernetes.io/name\""),
                ("team", "'team'"),
            ]
        );
    }

    #[test]
    fn test_keep_chomped_block_text() {
        let text = "a: |+\n  keep\n\nb: 1\nc: |\n  clip\n\nd: >+\n  fold\n  me\n\n\n";
        let doc = Document::parse_str(text).unwrap();
        assert_eq!(doc.get_string("$.a").unwrap(), Some("keep\n\n".to_string()));
        assert_eq!(doc.get_string("$.c").unwrap(), Some("clip\n".to_string()));
        assert_eq!(doc.get_string("$.d").unwrap(), Some("fold me\n\n\n".to_string()));
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn test_set_touches_only_the_target_line() {
        let mut doc = Document::parse_str(VALUES).unwrap();
        assert!(doc.set_string("$.image.tag", "2.4.0").unwrap());
        assert!(doc.set_string("$.ingress.hosts[0].paths[0].path", "/api").unwrap());
        assert!(doc.set_string("$.ingress.tls[0].hosts[0]", "api.example.local").unwrap());

        let expected = VALUES
            .replace("tag: \"2.3.1\"", "tag: \"2.4.0\"")
            .replace("- path: /", "- path: /api")
            .replace("    - chart-example.local\n\nsidecars", "    - api.example.local\n\nsidecars");
        assert_eq!(doc.render(), expected);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut doc = Document::parse_str(VALUES).unwrap();
        assert!(doc.set_string("$.image.tag", "2.4.0").unwrap());
        let first = doc.render();
        assert!(!doc.set_string("$.image.tag", "2.4.0").unwrap());
        assert_eq!(doc.render(), first);
    }

    #[test]
    fn test_set_keeps_inline_comment_and_quoting() {
        let mut doc = Document::parse_str("a: 'old'  # keep me\nb: plain # and me\nc: 1\n").unwrap();
        doc.set_string("$.a", "new").unwrap();
        doc.set_string("$.b", "true").unwrap();
        doc.set_string("$.c", "2").unwrap();
        assert_eq!(doc.render(), "a: 'new'  # keep me\nb: \"true\" # and me\nc: 2\n");
    }

    #[test]
    fn test_set_creates_keys() {
        let mut doc = Document::parse_str("image:\n  repository: x # repo\n  tag: 1.0.0\nother: 1\n").unwrap();
        assert!(doc.set_string("$.image.digest", "sha256:abc").unwrap());
        assert!(doc.set_string("$.added", "a b").unwrap());
        assert_eq!(
            doc.render(),
            "image:\n  repository: x # repo\n  tag: 1.0.0\n  digest: sha256:abc\nother: 1\nadded: a b\n"
        );
    }

    #[test]
    fn test_set_on_empty_values() {
        let mut doc = Document::parse_str("a:\nb: {}  # note\nc: ~\n").unwrap();
        assert!(doc.set_string("$.a", "x").unwrap());
        assert!(doc.set_string("$.b.key", "y").unwrap());
        assert!(doc.set_string("$.c", "z").unwrap());
        assert_eq!(doc.render(), "a: x\nb:  # note\n  key: y\nc: z\n");
    }

    #[test]
    fn test_set_in_empty_sequence_item_map() {
        let mut doc = Document::parse_str("items:\n- {}  # c\n- {}\n").unwrap();
        assert!(doc.set_string("$.items[0].k", "v").unwrap());
        assert!(doc.set_string("$.items[1].k", "w").unwrap());
        let rendered = doc.render();
        assert_eq!(rendered, "items:\n-  # c\n  k: v\n- k: w\n");

        let reread = Document::parse_str(&rendered).unwrap();
        assert_eq!(reread.get_string("$.items[0].k").unwrap(), Some("v".to_string()));
        assert_eq!(reread.get_string("$.items[1].k").unwrap(), Some("w".to_string()));
        assert_eq!(reread.render(), rendered);
    }

    #[test]
    fn test_set_on_null_leaf_keeps_string_type() {
        let mut doc = Document::parse_str("tag:\ntilde: ~\nword: null\nreplicas: 3\n").unwrap();
        assert!(doc.set_string("$.tag", "1.10").unwrap());
        assert!(doc.set_string("$.tilde", "true").unwrap());
        assert!(doc.set_string("$.word", "v2").unwrap());
        assert!(doc.set_string("$.replicas", "4").unwrap());
        assert!(doc.set_string("$.added", "1.10").unwrap());

        let rendered = doc.render();
        assert_eq!(
            rendered,
            "tag: \"1.10\"\ntilde: \"true\"\nword: v2\nreplicas: 4\nadded: \"1.10\"\n"
        );
        let reread = Document::parse_str(&rendered).unwrap();
        assert_eq!(reread.get_string("$.tag").unwrap(), Some("1.10".to_string()));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed["tag"], serde_yaml::Value::String("1.10".to_string()));
        assert_eq!(parsed["tilde"], serde_yaml::Value::String("true".to_string()));
        assert_eq!(parsed["replicas"], serde_yaml::Value::Number(4.into()));
    }

    #[test]
    fn test_set_in_block_sequence_items() {
        let mut doc = Document::parse_str("args:\n  - --port\n  - \"8080\"\n  -\n").unwrap();
        assert!(doc.set_string("$.args[1]", "9090").unwrap());
        assert!(doc.set_string("$.args[2]", "--verbose").unwrap());
        assert_eq!(doc.render(), "args:\n  - --port\n  - \"9090\"\n  - --verbose\n");
        assert_eq!(
            doc.set_string("$.args[3]", "x"),
            Err(PathError::not_found(crate::fieldpath::Path::parse("$.args[3]").unwrap()))
        );
    }

    #[test]
    fn test_set_replaces_block_scalar() {
        let mut doc = Document::parse_str("script: |\n  echo hi\n  exit 0\nnext: 1\n").unwrap();
        assert!(doc.set_string("$.script", "echo bye").unwrap());
        assert_eq!(doc.render(), "script: echo bye\nnext: 1\n");
    }

    #[test]
    fn test_malformed_input() {
        let cases: &[(&str, usize)] = &[
            ("a: 1\na: 2\n", 2),
            ("a: [1, 2]\n", 1),
            ("a: &anchor 1\n", 1),
            ("a: *anchor\n", 1),
            ("a:\n\t- b\n", 2),
            ("a: 1\n  b: 2\n", 2),
            ("a:\n  - x\n  b: 1\n", 3),
            ("plain scalar\n", 1),
            ("a: \"unterminated\n", 1),
            ("a: b: c\n", 1),
            ("? complex\n", 1),
            ("a: 1\n---\nb: 2\n", 2),
        ];
        for (text, line) in cases {
            match Document::parse_str(text) {
                Err(err @ ParseError::MalformedInput { .. }) => {
                    assert_eq!(err.line(), Some(*line), "wrong line for {:?}", text)
                }
                other => panic!("expected malformed input for {:?}, got {:?}", text, other),
            }
        }
        assert_eq!(Document::parse(&[b'a', b':', b' ', 0xff]).unwrap_err().line(), None);
    }
}
