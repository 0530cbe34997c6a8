//! Answer collection.
//!
//! Precedence, lowest first: manifest default, profile default, answers
//! file or stdin, `--set` overrides, interactive answer. A question is only
//! asked when nothing preloaded answers it and input is enabled.

use crate::config::{Config, Variable};
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use crate::variables::{Configuration, Value, YesNo};
use indexmap::IndexMap;
use log::debug;
use std::io::Read;
use std::path::Path;

pub type Answers = serde_json::Map<String, serde_json::Value>;

/// Parses a JSON answers object. Blank input means no answers.
pub fn parse_answers(content: &str) -> Result<Answers> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Answers::new());
    }
    match serde_json::from_str(content)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::ConfigError(format!(
            "answers must be a JSON object, got '{}'",
            other
        ))),
    }
}

pub fn load_from_stdin() -> Result<Answers> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer)
}

pub fn load_answers_file<P: AsRef<Path>>(path: P) -> Result<Answers> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_answers(&content)
}

/// Parses `KEY=VALUE` overrides. Values are kept as strings.
pub fn parse_overrides(pairs: &[String]) -> Result<Answers> {
    let mut answers = Answers::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::ConfigError(format!("override '{}' is not of the form KEY=VALUE", pair))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::ConfigError(format!("override '{}' has an empty key", pair)));
        }
        answers.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(answers)
}

/// Merges every non-interactive answer source.
pub fn get_preloaded_answers(
    stdin: bool,
    answers_file: Option<&Path>,
    overrides: &[String],
) -> Result<Answers> {
    let mut answers = Answers::new();
    if let Some(path) = answers_file {
        answers.extend(load_answers_file(path)?);
    }
    if stdin {
        answers.extend(load_from_stdin()?);
    }
    answers.extend(parse_overrides(overrides)?);
    Ok(answers)
}

/// Converts a raw JSON answer into the variable's value type.
pub fn coerce(key: &str, variable: &Variable, raw: &serde_json::Value) -> Result<Value> {
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => {
            if let Variable::YesNo { .. } = variable {
                return Ok(Value::Flag((*b).into()));
            }
            b.to_string()
        }
        serde_json::Value::Number(n) => n.to_string(),
        other => {
            return Err(Error::ValidationError(format!(
                "'{}' must be a string, got '{}'",
                key, other
            )))
        }
    };

    match variable {
        Variable::Text { .. } => Ok(Value::Text(text)),
        Variable::Choice { .. } => Ok(Value::Choice(text)),
        Variable::YesNo { .. } => YesNo::parse(&text).map(Value::Flag).ok_or_else(|| {
            Error::ValidationError(format!("'{}' must be 'y' or 'n', got '{}'", key, text))
        }),
    }
}

fn default_value(
    key: &str,
    variable: &Variable,
    profile_default: Option<&serde_json::Value>,
    context: &serde_json::Value,
    engine: &dyn TemplateRenderer,
) -> Result<Value> {
    if let Some(raw) = profile_default {
        return coerce(key, variable, raw);
    }
    Ok(match variable {
        Variable::Text { default, .. } => Value::Text(engine.render(default, context)?),
        Variable::Choice { choices, default, .. } => {
            let choice = default.as_ref().or_else(|| choices.first()).cloned().unwrap_or_default();
            Value::Choice(choice)
        }
        Variable::YesNo { default, .. } => Value::Flag(*default),
    })
}

fn ask(
    prompt: &dyn Prompter,
    question: &str,
    variable: &Variable,
    default: Value,
) -> Result<Value> {
    match variable {
        Variable::Text { .. } => Ok(Value::Text(prompt.text(question, default.as_str())?)),
        Variable::Choice { choices, .. } => {
            let index = choices.iter().position(|c| c == default.as_str()).unwrap_or(0);
            let selected = prompt.select(question, choices, index)?;
            choices.get(selected).cloned().map(Value::Choice).ok_or_else(|| {
                Error::ValidationError(format!("no choice at index {}", selected))
            })
        }
        Variable::YesNo { .. } => {
            let yes = prompt.confirm(question, default == Value::Flag(YesNo::Yes))?;
            Ok(Value::Flag(yes.into()))
        }
    }
}

/// Resolves every manifest variable into a [`Configuration`].
///
/// # Arguments
/// * `config` - Manifest declaring the variables
/// * `engine` - Renderer for templated defaults and derived values
/// * `prompt` - Asked for variables no preloaded answer covers
/// * `preloaded` - Answers from a file, stdin or `--set`
/// * `interactive` - Whether `prompt` may be used at all
///
/// # Returns
/// * `Result<Configuration>` - One value per variable, in declaration order
///
/// # Errors
/// * `Error::ValidationError` if an answer cannot be coerced to its variable type
/// * `Error::TemplateError` if a default fails to render
pub fn get_answers(
    config: &Config,
    engine: &dyn TemplateRenderer,
    prompt: &dyn Prompter,
    preloaded: &Answers,
    interactive: bool,
) -> Result<Configuration> {
    let mut configuration = Configuration::new(config.derived.clone());
    let mut profile_defaults: Option<&IndexMap<String, serde_json::Value>> = None;

    for key in preloaded.keys().filter(|k| !config.variables.contains_key(*k)) {
        debug!("Ignoring answer for unknown variable '{}'", key);
    }

    for (key, variable) in &config.variables {
        let current_context = configuration.user_context();

        let value = if let Some(raw) = preloaded.get(key) {
            coerce(key, variable, raw)?
        } else {
            let profile_default = profile_defaults.and_then(|defaults| defaults.get(key));
            let default = default_value(key, variable, profile_default, &current_context, engine)?;
            if interactive {
                let help = if variable.help().is_empty() { key.as_str() } else { variable.help() };
                // Help text may reference earlier answers.
                let question =
                    engine.render(help, &current_context).unwrap_or_else(|_| help.to_string());
                ask(prompt, &question, variable, default)?
            } else {
                default
            }
        };

        if config.profile_variable() == Some(key.as_str()) {
            profile_defaults =
                config.profiles.entries.get(value.as_str()).map(|profile| &profile.defaults);
        }
        configuration.set(key.clone(), value);
    }

    Ok(configuration)
}
