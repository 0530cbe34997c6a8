//! One-time side effects on the finished project.
//!
//! Steps run in this order: directory scaffolding, hook-manager config,
//! git bootstrap, hook installation, next-steps summary. Each step is
//! best-effort; a failure is logged as a warning and the next step still runs.

use crate::config::{HookManagerConfig, InitializerConfig};
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

const FALLBACK_AUTHOR: &str = "pybake";
const FALLBACK_EMAIL: &str = "pybake@localhost";

pub struct Initializer<'a> {
    engine: &'a dyn TemplateRenderer,
    config: &'a InitializerConfig,
    context: &'a serde_json::Value,
}

impl<'a> Initializer<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        config: &'a InitializerConfig,
        context: &'a serde_json::Value,
    ) -> Self {
        Self { engine, config, context }
    }

    pub fn run<P: AsRef<Path>>(&self, root: P) {
        let root = root.as_ref();

        println!("Creating additional directories...");
        if let Err(e) = self.scaffold_directories(root) {
            warn!("Directory scaffolding failed: {}", e);
        }

        let hooks = match self.hook_manager() {
            Ok(hooks) => hooks,
            Err(e) => {
                warn!("Could not evaluate hook manager condition: {}", e);
                None
            }
        };
        if let Some(hooks) = hooks {
            match write_hook_config(root, hooks) {
                Ok(true) => println!("Created {}", hooks.config_file),
                Ok(false) => debug!("{} already exists", hooks.config_file),
                Err(e) => warn!("Could not write {}: {}", hooks.config_file, e),
            }
        }

        if self.config.git.enabled {
            println!("Initializing git repository...");
            match self.bootstrap_git(root) {
                Ok(commit) => println!("Git repository initialized with commit {}", commit),
                Err(e) => warn!("Git not available or failed to initialize repository: {}", e),
            }
        }

        if let Some(hooks) = hooks {
            println!("Installing hooks...");
            if let Err(e) = install_hooks(root, hooks) {
                warn!("Hook installation failed: {}", e);
            }
        }

        match self.next_steps() {
            Ok(Some(summary)) => println!("{}", summary),
            Ok(None) => {}
            Err(e) => warn!("Could not render next steps: {}", e),
        }
    }

    fn holds(&self, when: Option<&str>) -> Result<bool> {
        match when {
            Some(when) => self.engine.predicate(when, self.context),
            None => Ok(true),
        }
    }

    /// Creates the configured directories and their namespace markers.
    /// Existing directories and markers are left untouched.
    ///
    /// Returns the created paths, relative to `root`.
    pub fn scaffold_directories(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for rule in &self.config.directories {
            if !self.holds(rule.when.as_deref())? {
                continue;
            }
            let Some(relative) = self.engine.render_path(Path::new(&rule.path), self.context)?
            else {
                continue;
            };
            let directory = root.join(&relative);
            if !directory.is_dir() {
                fs::create_dir_all(&directory)?;
                created.push(relative.clone());
            }

            let Some(marker) = &self.config.namespace_marker else {
                continue;
            };
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            let in_namespace = self
                .config
                .namespace_roots
                .iter()
                .any(|prefix| relative_str.starts_with(prefix.as_str()));
            if in_namespace && touch(&directory.join(marker))? {
                created.push(relative.join(marker));
            }
        }
        Ok(created)
    }

    /// The hook manager configuration when it is enabled for this project.
    pub fn hook_manager(&self) -> Result<Option<&'a HookManagerConfig>> {
        let config: &'a InitializerConfig = self.config;
        match &config.hook_manager {
            Some(hooks) if self.engine.predicate(&hooks.when, self.context)? => Ok(Some(hooks)),
            _ => Ok(None),
        }
    }

    /// Initializes a repository, stages everything and creates one commit.
    ///
    /// # Arguments
    /// * `root` - Project root to turn into a repository
    ///
    /// # Returns
    /// * `Result<git2::Oid>` - Id of the initial commit
    ///
    /// # Errors
    /// * `Error::Git2Error` if any repository operation fails
    pub fn bootstrap_git(&self, root: &Path) -> Result<git2::Oid> {
        let repo = git2::Repository::init(root)?;
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let signature = match repo.signature() {
            Ok(signature) => signature,
            Err(_) => {
                let name = self.render_or(self.config.git.author_name.as_deref(), FALLBACK_AUTHOR);
                let email =
                    self.render_or(self.config.git.author_email.as_deref(), FALLBACK_EMAIL);
                git2::Signature::now(&name, &email)?
            }
        };
        let commit = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &self.config.git.commit_message,
            &tree,
            &[],
        )?;
        Ok(commit)
    }

    fn render_or(&self, template: Option<&str>, fallback: &str) -> String {
        template
            .and_then(|t| self.engine.render(t, self.context).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Renders the next-steps summary, if the manifest has one.
    pub fn next_steps(&self) -> Result<Option<String>> {
        match &self.config.next_steps {
            Some(template) => Ok(Some(self.engine.render(template, self.context)?)),
            None => Ok(None),
        }
    }
}

/// Creates an empty file unless one exists. Never truncates.
fn touch(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(Error::IoError(e)),
    }
}

/// Writes the hook manager config unless the file already exists.
pub fn write_hook_config(root: &Path, hooks: &HookManagerConfig) -> Result<bool> {
    let path = root.join(&hooks.config_file);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, &hooks.config)?;
    Ok(true)
}

/// Runs the hook manager's install command inside `root`.
pub fn install_hooks(root: &Path, hooks: &HookManagerConfig) -> Result<()> {
    let (program, args) = hooks.install.split_first().ok_or_else(|| {
        Error::ConfigError("hook manager install command is empty".to_string())
    })?;
    let command = hooks.install.join(" ");
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| Error::CommandError { command: command.clone(), message: e.to_string() })?;

    if !output.status.success() {
        return Err(Error::CommandError {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
