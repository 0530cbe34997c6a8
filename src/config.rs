//! Template manifest handling for pybake.
//! Loads `pybake.json`, `pybake.yml` or `pybake.yaml` from a template
//! directory and checks it for internal consistency.

use crate::error::{Error, Result};
use crate::variables::YesNo;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Supported manifest file names, in lookup order.
pub const CONFIG_FILES: [&str; 3] = ["pybake.json", "pybake.yml", "pybake.yaml"];

/// One question of the template.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Variable {
    /// Free text. `default` is itself a template rendered against earlier answers.
    Text {
        #[serde(default)]
        help: String,
        #[serde(default)]
        default: String,
    },
    Choice {
        #[serde(default)]
        help: String,
        choices: Vec<String>,
        #[serde(default)]
        default: Option<String>,
    },
    YesNo {
        #[serde(default)]
        help: String,
        #[serde(default)]
        default: YesNo,
    },
}

impl Variable {
    pub fn help(&self) -> &str {
        match self {
            Variable::Text { help, .. }
            | Variable::Choice { help, .. }
            | Variable::YesNo { help, .. } => help,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profiles {
    /// Name of the choice variable selecting the profile.
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default)]
    pub entries: IndexMap<String, Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Defaults applied to questions asked after the profile is chosen.
    #[serde(default)]
    pub defaults: IndexMap<String, serde_json::Value>,
    /// Paths removed unconditionally when this profile is active.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub runtime_version: Option<RuntimeVersion>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeVersion {
    pub variable: String,
    pub allowed: Vec<String>,
}

/// Removes `path` after rendering when `when` holds.
#[derive(Debug, Clone, Deserialize)]
pub struct RemovalRule {
    pub when: String,
    pub path: String,
}

/// Path fragments the empty-file sweep never touches, optionally only
/// while `when` holds.
#[derive(Debug, Clone, Deserialize)]
pub struct PreserveGroup {
    #[serde(default)]
    pub when: Option<String>,
    pub fragments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub rules: Vec<RemovalRule>,
    pub preserve: Vec<PreserveGroup>,
    pub sweep_empty_files: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { rules: Vec::new(), preserve: Vec::new(), sweep_empty_files: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub enabled: bool,
    pub commit_message: String,
    /// Template for the commit author when git has no user configured.
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            commit_message: "Initial commit".to_string(),
            author_name: None,
            author_email: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookManagerConfig {
    pub when: String,
    pub config_file: String,
    pub config: String,
    /// Install command, program first.
    pub install: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryRule {
    pub path: String,
    #[serde(default)]
    pub when: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitializerConfig {
    pub git: GitConfig,
    pub hook_manager: Option<HookManagerConfig>,
    pub directories: Vec<DirectoryRule>,
    /// Directories under these prefixes get a `namespace_marker` file.
    pub namespace_roots: Vec<String>,
    pub namespace_marker: Option<String>,
    pub next_steps: Option<String>,
}

fn default_template_root() -> String {
    "template".to_string()
}

/// Parsed template manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_template_root")]
    pub template_root: String,
    pub variables: IndexMap<String, Variable>,
    #[serde(default)]
    pub derived: IndexMap<String, String>,
    #[serde(default)]
    pub profiles: Profiles,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub copy_without_render: Vec<String>,
    #[serde(default)]
    pub initializer: InitializerConfig,
}

impl Config {
    /// Directory holding the template tree.
    pub fn template_tree<P: AsRef<Path>>(&self, template_dir: P) -> PathBuf {
        template_dir.as_ref().join(&self.template_root)
    }

    /// Variable selecting the profile, if the manifest declares profiles.
    pub fn profile_variable(&self) -> Option<&str> {
        self.profiles.variable.as_deref()
    }

    fn check(&self) -> Result<()> {
        for (name, variable) in &self.variables {
            if let Variable::Choice { choices, default, .. } = variable {
                if choices.is_empty() {
                    return Err(Error::ConfigError(format!(
                        "choice variable '{}' has no choices",
                        name
                    )));
                }
                if let Some(default) = default {
                    if !choices.contains(default) {
                        return Err(Error::ConfigError(format!(
                            "default '{}' of '{}' is not one of its choices",
                            default, name
                        )));
                    }
                }
            }
        }

        if let Some(name) = self.derived.keys().find(|k| self.variables.contains_key(*k)) {
            return Err(Error::ConfigError(format!(
                "'{}' is declared both as a variable and as a derived value",
                name
            )));
        }

        if let Some(variable) = &self.profiles.variable {
            match self.variables.get(variable) {
                Some(Variable::Choice { choices, .. }) => {
                    let unknown = self.profiles.entries.keys().find(|p| !choices.contains(p));
                    if let Some(name) = unknown {
                        return Err(Error::ConfigError(format!(
                            "profile '{}' is not a choice of '{}'",
                            name, variable
                        )));
                    }
                }
                _ => {
                    return Err(Error::ConfigError(format!(
                        "profile variable '{}' must be a choice variable",
                        variable
                    )))
                }
            }
        }

        Ok(())
    }
}

/// Reads the first manifest found in `template_dir`.
pub fn load_config<P: AsRef<Path>>(template_dir: P, config_files: &[&str]) -> Result<String> {
    for file in config_files {
        let config_path = template_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return std::fs::read_to_string(&config_path).map_err(Error::IoError);
        }
    }

    Err(Error::ConfigError(format!(
        "No configuration file found (tried: {})",
        config_files.join(", ")
    )))
}

/// Parses manifest content, trying JSON first and YAML second.
///
/// # Arguments
/// * `content` - Raw manifest text
///
/// # Returns
/// * `Result<Config>` - The checked manifest
///
/// # Errors
/// * `Error::YAMLParseError` if the content is neither valid JSON nor YAML
/// * `Error::ConfigError` if the manifest is inconsistent
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(_) => serde_yaml::from_str(content)?,
    };
    config.check()?;
    Ok(config)
}

/// Loads and parses the manifest of a template directory.
pub fn get_config<P: AsRef<Path>>(template_dir: P) -> Result<Config> {
    let content = load_config(template_dir, &CONFIG_FILES)?;
    parse_config(&content)
}
