//! Template source resolution for pybake.
//! A template is either a local directory or a git repository cloned into
//! a cache directory before use.
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Represents the source location of a template.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS, git or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateSource::Git(repo) => write!(f, "git repository: '{}'", repo),
        }
    }
}

impl TemplateSource {
    /// Classifies a template argument. Anything that is not a git URL is a path.
    pub fn from_string(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }
        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }
        Self::FileSystem(PathBuf::from(s))
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Returns a local directory holding the template.
    fn load(&self) -> Result<PathBuf>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    fn load(&self) -> Result<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: path.display().to_string(),
            });
        }
        Ok(path.to_path_buf())
    }
}

/// Loader for templates from git repositories.
pub struct GitLoader<'a, S: AsRef<str>> {
    prompt: &'a dyn Prompter,
    repo: S,
    cache_dir: PathBuf,
    skip_overwrite_check: bool,
}

impl<'a, S: AsRef<str>> GitLoader<'a, S> {
    pub fn new(prompt: &'a dyn Prompter, repo: S, skip_overwrite_check: bool) -> Self {
        Self { prompt, repo, cache_dir: default_cache_dir(), skip_overwrite_check }
    }

    /// Clones into `cache_dir` instead of the default cache location.
    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Directory the repository is cloned into.
    pub fn clone_path(&self) -> PathBuf {
        self.cache_dir.join(repo_name(self.repo.as_ref()))
    }
}

/// Last path segment of a repository URL without `.git`.
pub fn repo_name(repo_url: &str) -> &str {
    let name = repo_url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or("template")
        .trim_end_matches(".git");
    if name.is_empty() {
        "template"
    } else {
        name
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("pybake")
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<'_, S> {
    fn load(&self) -> Result<PathBuf> {
        let repo_url = self.repo.as_ref();
        let clone_path = self.clone_path();

        if clone_path.exists() {
            let replace = self.skip_overwrite_check
                || self.prompt.confirm(
                    &format!("Directory '{}' already exists. Replace it?", clone_path.display()),
                    false,
                )?;
            if !replace {
                debug!("Using existing directory '{}'.", clone_path.display());
                return Ok(clone_path);
            }
            fs::remove_dir_all(&clone_path)?;
        }

        fs::create_dir_all(&self.cache_dir)?;
        debug!("Cloning repository '{}' to '{}'.", repo_url, clone_path.display());

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
        });
        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, &clone_path)?;
        Ok(clone_path)
    }
}

/// Returns the template directory for a template argument.
///
/// # Arguments
/// * `prompt` - Asked before overwriting an earlier clone
/// * `template` - Local path or git URL
/// * `skip_overwrite_check` - Replace an earlier clone without asking
///
/// # Returns
/// * `Result<PathBuf>` - Directory holding the template manifest
///
/// # Errors
/// * `Error::TemplateDoesNotExistsError` if a local path does not exist
/// * `Error::Git2Error` if cloning fails
pub fn load_template<S: AsRef<str>>(
    prompt: &dyn Prompter,
    template: S,
    skip_overwrite_check: bool,
) -> Result<PathBuf> {
    let template_source = TemplateSource::from_string(template.as_ref());
    println!("Using template from the {}", template_source);

    let loader: Box<dyn TemplateLoader + '_> = match template_source {
        TemplateSource::Git(repo) => Box::new(GitLoader::new(prompt, repo, skip_overwrite_check)),
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    loader.load()
}
