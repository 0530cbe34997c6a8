use pybake::error::Error;
use pybake::renderer::{is_residual_marker, BlockRenderer, TemplateRenderer};
use serde_json::json;
use std::path::{Path, PathBuf};

fn render(template: &str, context: serde_json::Value) -> String {
    BlockRenderer::new().render(template, &context).unwrap()
}

#[test]
fn test_plain_substitution() {
    let out = render("name = \"{{ project_slug }}\"", json!({"project_slug": "demo"}));
    assert_eq!(out, "name = \"demo\"");
}

#[test]
fn test_text_without_delimiters_is_unchanged() {
    let source = "def f():\n    return {\"a\": 1}\n";
    assert_eq!(render(source, json!({})), source);
}

#[test]
fn test_if_elif_else_selects_one_branch() {
    let template =
        "{% if cli == 'Typer' %}typer{% elif cli == 'Click' %}click{% else %}none{% endif %}";
    assert_eq!(render(template, json!({"cli": "Typer"})), "typer");
    assert_eq!(render(template, json!({"cli": "Click"})), "click");
    assert_eq!(render(template, json!({"cli": "None"})), "none");
}

#[test]
fn test_nested_conditionals() {
    let template = "{% if a == 'y' %}A{% if b == 'y' %}B{% endif %}{% endif %}";
    assert_eq!(render(template, json!({"a": "y", "b": "y"})), "AB");
    assert_eq!(render(template, json!({"a": "y", "b": "n"})), "A");
    assert_eq!(render(template, json!({"a": "n", "b": "y"})), "");
}

#[test]
fn test_false_region_leaves_no_marker_text() {
    let template = "{% if project_type != \"cli\" -%}\nweb only\n{% endif -%}\n";
    let out = render(template, json!({"project_type": "cli"}));
    assert_eq!(out, "");
    assert!(!out.contains("endif"));
}

#[test]
fn test_whitespace_control() {
    let template = "deps = [\n{%- if web == 'y' %}\n    \"fastapi\",\n{%- endif %}\n]";
    assert_eq!(render(template, json!({"web": "y"})), "deps = [\n    \"fastapi\",\n]");
    assert_eq!(render(template, json!({"web": "n"})), "deps = [\n]");
}

#[test]
fn test_raw_block_is_literal() {
    let template = "v: {% raw %}${{ matrix.python-version }}{% endraw %}";
    assert_eq!(render(template, json!({})), "v: ${{ matrix.python-version }}");
}

#[test]
fn test_comments_are_dropped() {
    assert_eq!(render("a{# note #}b", json!({})), "ab");
}

#[test]
fn test_case_filters() {
    let ctx = json!({"name": "My Cool Project"});
    assert_eq!(render("{{ name | snake_case }}", ctx.clone()), "my_cool_project");
    assert_eq!(render("{{ name | kebab_case }}", ctx.clone()), "my-cool-project");
    assert_eq!(render("{{ name | pascal_case }}", ctx), "MyCoolProject");
}

#[test]
fn test_undefined_variable_is_an_error() {
    let result = BlockRenderer::new().render("{{ missing }}", &json!({}));
    assert!(matches!(result, Err(Error::TemplateError(_))));

    let result = BlockRenderer::new().render("{% if missing %}x{% endif %}", &json!({}));
    assert!(result.is_err());
}

#[test]
fn test_malformed_blocks_are_syntax_errors() {
    let engine = BlockRenderer::new();
    let ctx = json!({"a": "y"});

    let err = engine.render("line\n{{ a + }}\n", &ctx).unwrap_err();
    assert!(matches!(err, Error::SyntaxError { line: 2, .. }));

    assert!(matches!(
        engine.render("line\n{% if a == 'y' %}open", &ctx),
        Err(Error::SyntaxError { .. })
    ));
    assert!(matches!(engine.render("{% endif %}", &ctx), Err(Error::SyntaxError { .. })));
}

#[test]
fn test_delimiters_inside_string_literals() {
    assert_eq!(render("a {{ \"}}\" }} b", json!({})), "a }} b");

    let template = "{% if x == \"%}\" %}yes{% endif %}";
    assert_eq!(render(template, json!({"x": "%}"})), "yes");
    assert_eq!(render(template, json!({"x": "other"})), "");
}

#[test]
fn test_tag_without_space_before_parenthesis() {
    let template = "{% if(x) %}yes{% else %}no{% endif %}";
    assert_eq!(render(template, json!({"x": "y"})), "yes");
    assert_eq!(render(template, json!({"x": ""})), "no");
}

#[test]
fn test_true_wrapper_renders_inner_content_exactly() {
    let inner =
        "FROM python:{{ version }}\nRUN pip install {{ package }}\n\nCMD [\"{{ package }}\"]\n";
    let wrapped = format!("{{% if use_docker == 'y' %}}{}{{% endif %}}", inner);
    let ctx = json!({"use_docker": "y", "version": "3.12", "package": "demo"});

    let expected = "FROM python:3.12\nRUN pip install demo\n\nCMD [\"demo\"]\n";
    assert_eq!(render(inner, ctx.clone()), expected);
    assert_eq!(render(&wrapped, ctx), expected);
}

#[test]
fn test_trailing_newline_is_kept() {
    assert_eq!(render("x = {{ v }}\n", json!({"v": 1})), "x = 1\n");
}

#[test]
fn test_evaluate_and_predicate() {
    let engine = BlockRenderer::new();
    let ctx = json!({"project_type": "web"});

    let value = engine.evaluate("'fastapi' if project_type != 'cli' else 'none'", &ctx).unwrap();
    assert_eq!(value, json!("fastapi"));
    assert!(engine.predicate("project_type == 'web'", &ctx).unwrap());
    assert!(!engine.predicate("project_type == 'cli'", &ctx).unwrap());
}

#[test]
fn test_render_path() {
    let engine = BlockRenderer::new();
    let ctx = json!({"project_slug": "demo", "empty": ""});

    let path = engine.render_path(Path::new("src/{{ project_slug }}/cli.py"), &ctx).unwrap();
    assert_eq!(path, Some(PathBuf::from("src/demo/cli.py")));

    let path = engine.render_path(Path::new("src/{{ empty }}/cli.py"), &ctx).unwrap();
    assert_eq!(path, None);
}

#[test]
fn test_render_path_rejects_escapes() {
    let engine = BlockRenderer::new();
    let ctx = json!({"up": ".."});

    assert!(engine.render_path(Path::new("{{ up }}/x"), &ctx).is_err());
    assert!(engine.render_path(Path::new("/etc/passwd"), &ctx).is_err());
}

#[test]
fn test_is_residual_marker() {
    assert!(is_residual_marker("{% endif %}"));
    assert!(is_residual_marker("  {%- endif -%}\n"));
    assert!(!is_residual_marker("{% if a %}"));
    assert!(!is_residual_marker("print('hi')"));
    assert!(!is_residual_marker(""));
}
