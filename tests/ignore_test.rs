use pybake::config::parse_config;
use pybake::ignore::{build_glob_set, copy_without_render_set, ignore_set, DEFAULT_IGNORE_PATTERNS};

#[test]
fn test_default_patterns() {
    let set = build_glob_set::<&str>(&[], &DEFAULT_IGNORE_PATTERNS).unwrap();
    assert!(set.is_match("src/pkg/__pycache__"));
    assert!(set.is_match("src/pkg/module.pyc"));
    assert!(set.is_match(".DS_Store"));
    assert!(!set.is_match("src/pkg/module.py"));
}

#[test]
fn test_blank_and_comment_lines_are_skipped() {
    let set = build_glob_set(&["", "# comment", "*.log"], &[]).unwrap();
    assert!(set.is_match("debug.log"));
    assert!(!set.is_match("# comment"));
}

#[test]
fn test_invalid_pattern() {
    assert!(build_glob_set(&["a[b"], &[]).is_err());
}

#[test]
fn test_sets_from_config() {
    let config = parse_config(
        r#"
variables: {}
ignore: ["**/*.swp"]
copy_without_render: ["**/*.png"]
"#,
    )
    .unwrap();

    let ignored = ignore_set(&config).unwrap();
    assert!(ignored.is_match("notes.txt.swp"));
    assert!(ignored.is_match("a/__pycache__"));

    let verbatim = copy_without_render_set(&config).unwrap();
    assert!(verbatim.is_match("docs/logo.png"));
    assert!(!verbatim.is_match("docs/index.md"));
}
