//! Post-generation pruning of the materialized tree.
//!
//! Three passes, in order: configuration-driven removal rules, the
//! empty-file sweep, and the exclusions of the active profile. Every delete
//! is best-effort: a failure is logged and the pass continues. Running the
//! cleanser again on its own output removes nothing.

use crate::config::{CleanupConfig, Config, Profile};
use crate::renderer::{is_residual_marker, TemplateRenderer};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a cleanser run removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Removed paths, relative to the output root.
    pub removed: Vec<PathBuf>,
    pub failures: usize,
}

/// Deletes a file or a whole directory. Returns `false` if nothing was there.
pub fn remove_path(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// True for content the sweep treats as a stub: blank, or a lone block end tag.
pub fn is_vestigial(content: &str) -> bool {
    let content = content.trim();
    content.is_empty() || is_residual_marker(content)
}

pub struct Cleanser<'a> {
    engine: &'a dyn TemplateRenderer,
    cleanup: &'a CleanupConfig,
    profile: Option<&'a Profile>,
    context: &'a serde_json::Value,
    sweep_empty_files: bool,
}

impl<'a> Cleanser<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        config: &'a Config,
        context: &'a serde_json::Value,
    ) -> Self {
        let profile = config
            .profile_variable()
            .and_then(|variable| context.get(variable))
            .and_then(|value| value.as_str())
            .and_then(|name| config.profiles.entries.get(name));
        Self {
            engine,
            cleanup: &config.cleanup,
            profile,
            context,
            sweep_empty_files: config.cleanup.sweep_empty_files,
        }
    }

    /// Disables the empty-file sweep regardless of the manifest.
    pub fn keep_empty_files(mut self, keep: bool) -> Self {
        if keep {
            self.sweep_empty_files = false;
        }
        self
    }

    /// Prunes the generated tree under `root`.
    ///
    /// Removal rules run shallowest first, then the empty-file sweep, then
    /// the active profile's exclusions. Every removal is attempted even
    /// when earlier ones fail, and running twice removes nothing new.
    ///
    /// # Arguments
    /// * `root` - Output root the tree was written to
    ///
    /// # Returns
    /// * `CleanupReport` - Removed paths and per-path failures
    pub fn run<P: AsRef<Path>>(&self, root: P) -> CleanupReport {
        let root = root.as_ref();
        let mut report = CleanupReport::default();

        let targets = self.rule_targets();
        remove_targets(root, &targets, &mut report);

        if self.sweep_empty_files {
            self.sweep(root, &mut report);
        }

        let exclusions = self.profile_targets();
        remove_targets(root, &exclusions, &mut report);

        report
    }

    fn render_target(&self, path: &str) -> Option<PathBuf> {
        match self.engine.render_path(Path::new(path), self.context) {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping removal of '{}': {}", path, e);
                None
            }
        }
    }

    /// Paths named by removal rules whose condition holds.
    pub fn rule_targets(&self) -> Vec<PathBuf> {
        self.cleanup
            .rules
            .iter()
            .filter(|rule| match self.engine.predicate(&rule.when, self.context) {
                Ok(holds) => holds,
                Err(e) => {
                    warn!("Skipping removal rule for '{}': {}", rule.path, e);
                    false
                }
            })
            .filter_map(|rule| self.render_target(&rule.path))
            .collect()
    }

    /// Paths excluded by the active profile.
    pub fn profile_targets(&self) -> Vec<PathBuf> {
        self.profile
            .map(|profile| profile.exclude.iter().filter_map(|p| self.render_target(p)).collect())
            .unwrap_or_default()
    }

    fn preserved_fragments(&self) -> Vec<&'a str> {
        let cleanup: &'a CleanupConfig = self.cleanup;
        let mut fragments = Vec::new();
        for group in &cleanup.preserve {
            let active = match &group.when {
                Some(when) => self.engine.predicate(when, self.context).unwrap_or_else(|e| {
                    warn!("Preserve condition '{}' failed, preserving anyway: {}", when, e);
                    true
                }),
                None => true,
            };
            if active {
                fragments.extend(group.fragments.iter().map(String::as_str));
            }
        }
        fragments
    }

    /// Deletes text files that rendered to nothing. Binary and unreadable
    /// files are left alone, as is anything matching the preserve set.
    pub fn sweep(&self, root: &Path, report: &mut CleanupReport) {
        let preserved = self.preserved_fragments();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("{}", e);
                    report.failures += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let relative_str = relative.to_string_lossy();
            if preserved.iter().any(|fragment| relative_str.contains(fragment)) {
                continue;
            }

            let content = match fs::read(entry.path()) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => continue,
                },
                Err(e) => {
                    warn!("Could not read '{}': {}", entry.path().display(), e);
                    continue;
                }
            };
            if !is_vestigial(&content) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    println!("Removed empty file: '{}'", relative.display());
                    report.removed.push(relative.to_path_buf());
                }
                Err(e) => {
                    warn!("Could not remove '{}': {}", entry.path().display(), e);
                    report.failures += 1;
                }
            }
        }
    }
}

/// Removes `targets` under `root`, shallowest first. A target inside a
/// directory removed earlier in the same call is already gone and skipped.
fn remove_targets(root: &Path, targets: &[PathBuf], report: &mut CleanupReport) {
    let mut ordered: Vec<&PathBuf> = targets.iter().collect();
    ordered.sort_by_key(|target| target.components().count());

    let mut removed: Vec<&PathBuf> = Vec::new();
    for target in ordered {
        if removed.iter().any(|parent| target.starts_with(parent)) {
            debug!("'{}' went with its parent directory", target.display());
            continue;
        }
        match remove_path(&root.join(target)) {
            Ok(true) => {
                println!("Removed: '{}'", target.display());
                report.removed.push(target.clone());
                removed.push(target);
            }
            Ok(false) => debug!("'{}' does not exist", target.display()),
            Err(e) => {
                warn!("Could not remove '{}': {}", target.display(), e);
                report.failures += 1;
            }
        }
    }
}
