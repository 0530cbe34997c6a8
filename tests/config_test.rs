use pybake::config::{get_config, load_config, parse_config, Variable, CONFIG_FILES};
use pybake::error::Error;
use pybake::variables::YesNo;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn bundled_template() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/python-project")
}

const MINIMAL_YAML: &str = r#"
variables:
  project_name:
    type: text
    default: Demo
  project_type:
    type: choice
    choices: [web, cli]
  use_docker:
    type: yes_no
    default: y
"#;

#[test]
fn test_parse_yaml() {
    let config = parse_config(MINIMAL_YAML).unwrap();

    assert_eq!(config.template_root, "template");
    assert_eq!(config.variables.len(), 3);
    let names: Vec<&str> = config.variables.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["project_name", "project_type", "use_docker"]);
    assert!(matches!(
        config.variables["use_docker"],
        Variable::YesNo { default: YesNo::Yes, .. }
    ));
    assert!(config.cleanup.sweep_empty_files);
    assert!(config.initializer.git.enabled);
}

#[test]
fn test_parse_json() {
    let content = r#"{
        "template_root": "tree",
        "variables": {
            "project_slug": {"type": "text", "default": "{{ project_name | snake_case }}"},
            "use_docker": {"type": "yes_no", "default": false}
        },
        "cleanup": {"sweep_empty_files": false}
    }"#;
    let config = parse_config(content).unwrap();

    assert_eq!(config.template_root, "tree");
    assert!(matches!(
        config.variables["use_docker"],
        Variable::YesNo { default: YesNo::No, .. }
    ));
    assert!(!config.cleanup.sweep_empty_files);
}

#[test]
fn test_unknown_variable_type() {
    let content = "variables:\n  x:\n    type: number\n";
    assert!(matches!(parse_config(content), Err(Error::YAMLParseError(_))));
}

#[test]
fn test_choice_without_choices() {
    let content = "variables:\n  x:\n    type: choice\n    choices: []\n";
    assert!(matches!(parse_config(content), Err(Error::ConfigError(_))));
}

#[test]
fn test_choice_default_must_be_a_choice() {
    let content = "variables:\n  x:\n    type: choice\n    choices: [a, b]\n    default: c\n";
    assert!(matches!(parse_config(content), Err(Error::ConfigError(_))));
}

#[test]
fn test_derived_name_collision() {
    let content = format!("{}derived:\n  project_name: \"'x'\"\n", MINIMAL_YAML);
    assert!(matches!(parse_config(&content), Err(Error::ConfigError(_))));
}

#[test]
fn test_profile_checks() {
    let content = format!("{}profiles:\n  variable: project_name\n", MINIMAL_YAML);
    assert!(matches!(parse_config(&content), Err(Error::ConfigError(_))));

    let content = format!(
        "{}profiles:\n  variable: project_type\n  entries:\n    desktop: {{}}\n",
        MINIMAL_YAML
    );
    assert!(matches!(parse_config(&content), Err(Error::ConfigError(_))));

    let content = format!(
        "{}profiles:\n  variable: project_type\n  entries:\n    cli:\n      exclude: [core]\n",
        MINIMAL_YAML
    );
    let config = parse_config(&content).unwrap();
    assert_eq!(config.profile_variable(), Some("project_type"));
    assert_eq!(config.profiles.entries["cli"].exclude, vec!["core"]);
}

#[test]
fn test_load_config_lookup_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("pybake.yaml"), MINIMAL_YAML).unwrap();
    fs::write(temp_dir.path().join("pybake.json"), r#"{"variables": {}}"#).unwrap();

    let content = load_config(temp_dir.path(), &CONFIG_FILES).unwrap();
    assert_eq!(content, r#"{"variables": {}}"#);
}

#[test]
fn test_missing_config() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(get_config(temp_dir.path()), Err(Error::ConfigError(_))));
}

#[test]
fn test_template_tree() {
    let config = parse_config(MINIMAL_YAML).unwrap();
    assert_eq!(config.template_tree("/tmp/t"), PathBuf::from("/tmp/t/template"));
}

#[test]
fn test_bundled_template_config() {
    let config = get_config(bundled_template()).unwrap();

    assert_eq!(config.profile_variable(), Some("project_type"));
    assert_eq!(config.validation.identifier.as_deref(), Some("project_slug"));
    assert!(config.derived.contains_key("web_framework"));
    assert!(config.initializer.hook_manager.is_some());
    assert!(config.template_tree(bundled_template()).is_dir());
}
