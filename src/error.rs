//! Error handling for pybake.
//! Defines the error type and result alias used throughout the crate.

use thiserror::Error;

/// All errors that can occur while generating a project.
///
/// Only errors raised before the first file is written are fatal for the
/// process. Errors from the cleanup and initialization phases are caught at
/// the call site and logged.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}.")]
    TemplateError(String),

    /// A template failed to parse, e.g. an unclosed or stray block tag.
    #[error("Template syntax error at line {line}: {message}.")]
    SyntaxError { line: usize, message: String },

    #[error("Expression error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Failed to parse JSON: {0}.")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}.")]
    YAMLParseError(#[from] serde_yaml::Error),

    /// One or more fatal validation findings; every finding is listed.
    #[error("Validation error: {0}.")]
    ValidationError(String),

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    #[error("Invalid ignore pattern: {0}.")]
    GlobError(#[from] globset::Error),

    #[error("Failed to traverse '{0}'.")]
    WalkError(#[from] walkdir::Error),

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// An external tool ran but did not succeed.
    #[error("Command '{command}' failed: {message}.")]
    CommandError { command: String, message: String },
}

/// Convenience type alias for Results with pybake's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
