//! Path pattern handling for pybake templates.
//! Builds the glob sets deciding which template entries are skipped and
//! which files are copied without rendering.

use crate::config::Config;
use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

/// Patterns that are always ignored.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 3] = ["**/.DS_Store", "**/__pycache__", "**/*.pyc"];

/// Compiles `patterns` and `defaults` into one glob set.
///
/// Patterns match template-relative paths with `/` separators, e.g.
/// `src/{{ project_slug }}/logo.png`.
pub fn build_glob_set<S: AsRef<str>>(patterns: &[S], defaults: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in defaults.iter().copied().chain(patterns.iter().map(AsRef::as_ref)) {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern.starts_with('#') {
            continue;
        }
        debug!("Adding pattern '{}'", pattern);
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Entries never materialized.
pub fn ignore_set(config: &Config) -> Result<GlobSet> {
    build_glob_set(&config.ignore, &DEFAULT_IGNORE_PATTERNS)
}

/// Files copied byte-for-byte instead of rendered.
pub fn copy_without_render_set(config: &Config) -> Result<GlobSet> {
    build_glob_set(&config.copy_without_render, &[])
}
