//! Template renderer for pybake.
//! Renders file contents, path components and standalone expressions with
//! MiniJinja, under strict undefined behavior and with case filters.
use crate::error::{Error, Result};
use cruet::Inflector;
use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use std::path::{Component, Path, PathBuf};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;

    /// Evaluates a single expression, e.g. `project_type != 'cli'`.
    fn evaluate(&self, expression: &str, context: &serde_json::Value)
        -> Result<serde_json::Value>;

    /// Evaluates an expression for its truthiness.
    fn predicate(&self, expression: &str, context: &serde_json::Value) -> Result<bool>;

    /// Renders every component of `path` separately.
    ///
    /// # Returns
    /// * `Ok(None)` when any component renders to an empty string, which
    ///   drops the entry together with everything below it
    ///
    /// # Errors
    /// * `Error::TemplateError` if `path` is absolute or a component renders
    ///   to `..` or an absolute path
    fn render_path(&self, path: &Path, context: &serde_json::Value) -> Result<Option<PathBuf>> {
        let mut rendered = PathBuf::new();
        for component in path.components() {
            let segment = match component {
                Component::Normal(segment) => segment.to_string_lossy(),
                Component::CurDir => continue,
                _ => {
                    return Err(Error::TemplateError(format!(
                        "template path '{}' must be relative",
                        path.display()
                    )))
                }
            };
            let segment = self.render(&segment, context)?;
            let segment = segment.trim();
            if segment.is_empty() {
                return Ok(None);
            }
            if segment == ".." || segment.starts_with('/') {
                return Err(Error::TemplateError(format!(
                    "path component '{}' escapes the output directory",
                    segment
                )));
            }
            rendered.push(segment);
        }
        Ok(Some(rendered))
    }
}

/// MiniJinja-based renderer with strict undefined handling.
pub struct BlockRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

fn snake_case(value: String) -> String {
    value.to_snake_case()
}

fn kebab_case(value: String) -> String {
    value.to_kebab_case()
}

fn pascal_case(value: String) -> String {
    value.to_pascal_case()
}

fn title_case(value: String) -> String {
    value.to_title_case()
}

impl BlockRenderer {
    /// Creates a renderer whose environment keeps trailing newlines and
    /// fails on undefined values.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_filter("snake_case", snake_case);
        env.add_filter("kebab_case", kebab_case);
        env.add_filter("pascal_case", pascal_case);
        env.add_filter("title_case", title_case);
        Self { env }
    }

    fn eval(&self, expression: &str, context: &serde_json::Value) -> Result<Value> {
        let describe = |e: minijinja::Error| {
            Error::TemplateError(format!("'{}': {}", expression, e))
        };
        let value = self
            .env
            .compile_expression_owned(expression.to_string())
            .map_err(describe)?
            .eval(context)
            .map_err(describe)?;
        if value.is_undefined() {
            return Err(Error::TemplateError(format!("'{}' is undefined", expression)));
        }
        Ok(value)
    }
}

impl Default for BlockRenderer {
    fn default() -> Self {
        BlockRenderer::new()
    }
}

/// Maps a MiniJinja error onto the crate's error type, keeping the line of
/// syntax errors.
fn template_error(err: minijinja::Error) -> Error {
    if err.kind() == ErrorKind::SyntaxError {
        return Error::SyntaxError {
            line: err.line().unwrap_or(1),
            message: err.detail().unwrap_or("invalid syntax").to_string(),
        };
    }
    Error::TemplateError(err.to_string())
}

impl TemplateRenderer for BlockRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::SyntaxError` if the template does not parse
    /// * `Error::TemplateError` if rendering fails, including any use of an
    ///   undefined variable
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_str(template, context).map_err(template_error)
    }

    fn evaluate(
        &self,
        expression: &str,
        context: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let value = self.eval(expression, context)?;
        Ok(serde_json::to_value(&value)?)
    }

    fn predicate(&self, expression: &str, context: &serde_json::Value) -> Result<bool> {
        Ok(self.eval(expression, context)?.is_true())
    }
}

/// True when `content` is nothing but a single block end tag, such as
/// `{% endif %}`: the remnant of a conditional whose opening tag is gone.
///
/// The tag must also fail to parse on its own, so text that only looks like
/// an end tag is never treated as a remnant.
pub fn is_residual_marker(content: &str) -> bool {
    let content = content.trim();
    let Some(body) = content.strip_prefix("{%").and_then(|rest| rest.strip_suffix("%}")) else {
        return false;
    };
    let name = body.trim_matches(|c: char| c == '-' || c == '+' || c.is_whitespace());
    let is_word = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_word || !name.starts_with("end") {
        return false;
    }
    let env = Environment::new();
    env.template_from_str(content).err().is_some_and(|e| e.kind() == ErrorKind::SyntaxError)
}
