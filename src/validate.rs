//! Pre-generation checks on the resolved configuration.
//!
//! Identifier, package name, runtime version and choice membership
//! violations are fatal. A malformed email is only a warning.

use crate::config::{Config, Variable};
use crate::error::{Error, Result};
use crate::variables::Configuration;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Reserved keywords of the generated package's module system.
pub const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Longest package name an index accepts.
pub const MAX_PACKAGE_NAME_LEN: usize = 214;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("valid regex"));

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9._-]*[a-zA-Z0-9])?$").expect("valid regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub variable: String,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

pub fn check_identifier(value: &str) -> std::result::Result<(), String> {
    if !IDENTIFIER.is_match(value) {
        return Err(format!(
            "'{}' is not a valid module name: it must start with a letter or underscore \
             and contain only letters, digits and underscores",
            value
        ));
    }
    if PYTHON_KEYWORDS.contains(&value) {
        return Err(format!("'{}' is a reserved keyword", value));
    }
    Ok(())
}

pub fn check_package_name(value: &str) -> std::result::Result<(), String> {
    if !PACKAGE_NAME.is_match(value) {
        return Err(format!(
            "'{}' is not a valid package name: it must start and end with a letter or digit \
             and contain only letters, digits, '.', '_' and '-'",
            value
        ));
    }
    if value.len() > MAX_PACKAGE_NAME_LEN {
        return Err(format!(
            "package name is too long ({} > {} characters)",
            value.len(),
            MAX_PACKAGE_NAME_LEN
        ));
    }
    Ok(())
}

pub fn check_runtime_version(value: &str, allowed: &[String]) -> std::result::Result<(), String> {
    if allowed.iter().any(|v| v == value) {
        return Ok(());
    }
    Err(format!("version '{}' is not supported, choose from: {}", value, allowed.join(", ")))
}

pub fn check_email(value: &str) -> std::result::Result<(), String> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(format!("'{}' might not be a valid email address", value))
    }
}

/// Runs every check the manifest asks for. Checks are independent of each
/// other and of their order.
pub struct Validator<'a> {
    config: &'a Config,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Returns all findings, fatal and otherwise, in a stable order.
    pub fn check(&self, configuration: &Configuration) -> Vec<Finding> {
        let mut findings = Vec::new();
        let validation = &self.config.validation;

        let mut run = |variable: &str,
                       severity: Severity,
                       check: &dyn Fn(&str) -> std::result::Result<(), String>| {
            let outcome = match configuration.value(variable) {
                Some(value) => check(value.as_str()),
                None => Err("variable is not defined".to_string()),
            };
            if let Err(message) = outcome {
                findings.push(Finding { variable: variable.to_string(), severity, message });
            }
        };

        if let Some(variable) = &validation.identifier {
            run(variable, Severity::Fatal, &check_identifier);
        }
        if let Some(variable) = &validation.package_name {
            run(variable, Severity::Fatal, &check_package_name);
        }
        if let Some(version) = &validation.runtime_version {
            let allowed = &version.allowed;
            run(&version.variable, Severity::Fatal, &|v| check_runtime_version(v, allowed));
        }
        for (name, variable) in &self.config.variables {
            if let Variable::Choice { choices, .. } = variable {
                run(name, Severity::Fatal, &|v| {
                    if choices.iter().any(|c| c == v) {
                        Ok(())
                    } else {
                        Err(format!("'{}' is not one of: {}", v, choices.join(", ")))
                    }
                });
            }
        }
        if let Some(variable) = &validation.email {
            run(variable, Severity::Warning, &check_email);
        }

        findings
    }

    /// Fails with every fatal finding, or returns the warnings.
    pub fn validate(&self, configuration: &Configuration) -> Result<Vec<Finding>> {
        let (fatal, warnings): (Vec<_>, Vec<_>) = self
            .check(configuration)
            .into_iter()
            .partition(|finding| finding.severity == Severity::Fatal);
        if fatal.is_empty() {
            return Ok(warnings);
        }
        let messages: Vec<String> = fatal.iter().map(Finding::to_string).collect();
        Err(Error::ValidationError(messages.join("; ")))
    }
}
