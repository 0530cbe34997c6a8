//! Renders a template tree into [`FileNode`]s and writes them out.
//!
//! Rendering is pure: it reads the template tree and the context and returns
//! the nodes to materialize. A file whose whole content sits in a false
//! conditional renders to an empty node; pruning it is the cleanser's job.

use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use globset::GlobSet;
use log::{debug, error};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Directory,
    Rendered(String),
    /// Copied byte-for-byte from the template file.
    Copied(PathBuf),
}

/// One entry of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Path relative to the output root.
    pub path: PathBuf,
    pub content: NodeContent,
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Template-relative path with `/` separators, as glob patterns expect.
pub fn relative_path_str(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct Processor<'a> {
    engine: &'a dyn TemplateRenderer,
    template_root: &'a Path,
    context: &'a serde_json::Value,
    ignored: &'a GlobSet,
    verbatim: &'a GlobSet,
}

impl<'a> Processor<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        template_root: &'a Path,
        context: &'a serde_json::Value,
        ignored: &'a GlobSet,
        verbatim: &'a GlobSet,
    ) -> Self {
        Self { engine, template_root, context, ignored, verbatim }
    }

    /// Resolves one template entry.
    ///
    /// # Arguments
    /// * `template_entry` - Path of a file or directory inside the template root
    ///
    /// # Returns
    /// * `Ok(Some(FileNode))` - The node to write, with its rendered path
    /// * `Ok(None)` - The entry is ignored or its path rendered empty
    ///
    /// # Errors
    /// * `Error::TemplateError` if the path or the content fails to render
    /// * `Error::IoError` if the template file cannot be read
    pub fn process(&self, template_entry: &Path) -> Result<Option<FileNode>> {
        let relative = template_entry
            .strip_prefix(self.template_root)
            .map_err(|e| Error::TemplateError(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            return Ok(None);
        }

        let relative_str = relative_path_str(relative);
        if self.ignored.is_match(&relative_str) {
            debug!("Skipping '{}': matches an ignore pattern", relative_str);
            return Ok(None);
        }

        let path = match self.engine.render_path(relative, self.context)? {
            Some(path) => path,
            None => {
                debug!("Skipping '{}': path rendered empty", relative_str);
                return Ok(None);
            }
        };

        if template_entry.is_dir() {
            return Ok(Some(FileNode { path, content: NodeContent::Directory }));
        }

        let copied = FileNode {
            path: path.clone(),
            content: NodeContent::Copied(template_entry.to_path_buf()),
        };
        if self.verbatim.is_match(&relative_str) {
            return Ok(Some(copied));
        }
        let bytes = fs::read(template_entry)?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                let rendered = self.engine.render(&text, self.context).map_err(|e| {
                    Error::TemplateError(format!("{}: {}", relative_str, e))
                })?;
                Ok(Some(FileNode { path, content: NodeContent::Rendered(rendered) }))
            }
            Err(_) => Ok(Some(copied)),
        }
    }

    /// Resolves the whole tree in file-name order.
    ///
    /// Entries that fail to render are logged and left out, as are entries
    /// whose rendered path collides with one already planned: two files on
    /// one path, a file and a directory on one path, or anything below a file.
    pub fn render_tree(&self) -> Vec<FileNode> {
        let mut nodes = Vec::new();
        let mut planned: HashMap<PathBuf, bool> = HashMap::new();
        for dir_entry in WalkDir::new(self.template_root).sort_by_file_name() {
            let entry = match dir_entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("{}", Error::WalkError(e));
                    continue;
                }
            };
            match self.process(entry.path()) {
                Ok(Some(node)) => {
                    if let Some(reason) = conflict(&planned, &node) {
                        error!(
                            "Skipping '{}': rendered path '{}' {}",
                            entry.path().display(),
                            node.path.display(),
                            reason
                        );
                        continue;
                    }
                    let is_dir = node.content == NodeContent::Directory;
                    if planned.insert(node.path.clone(), is_dir).is_none() {
                        nodes.push(node);
                    }
                }
                Ok(None) => {}
                Err(e) => error!("{}", e),
            }
        }
        nodes
    }
}

/// Describes why `node` cannot join the planned tree, if it cannot.
/// A directory rendered twice is merged, not a conflict.
fn conflict(planned: &HashMap<PathBuf, bool>, node: &FileNode) -> Option<&'static str> {
    let is_dir = node.content == NodeContent::Directory;
    match planned.get(&node.path) {
        Some(true) if is_dir => return None,
        Some(true) => return Some("is already a directory"),
        Some(false) => return Some("is already a file"),
        None => {}
    }
    let below_file =
        node.path.ancestors().skip(1).any(|parent| planned.get(parent) == Some(&false));
    below_file.then_some("lies below a file")
}

/// Writes `nodes` under `output_root`, creating parents as needed.
///
/// Writing is best effort: a node that cannot be written is logged and the
/// remaining nodes are still attempted.
///
/// # Arguments
/// * `output_root` - Directory the node paths are relative to
/// * `nodes` - Nodes produced by [`Processor::render_tree`]
///
/// # Returns
/// * `Result<usize>` - Number of nodes that could not be written
///
/// # Errors
/// * `Error::IoError` if `output_root` itself cannot be created
pub fn materialize<P: AsRef<Path>>(output_root: P, nodes: &[FileNode]) -> Result<usize> {
    let output_root = output_root.as_ref();
    fs::create_dir_all(output_root)?;
    let mut failures = 0;
    for node in nodes {
        let target = output_root.join(&node.path);
        if let Err(e) = write_node(&target, &node.content) {
            error!("Failed to write '{}': {}", target.display(), e);
            failures += 1;
        }
    }
    Ok(failures)
}

fn write_node(target: &Path, content: &NodeContent) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match content {
        NodeContent::Directory => {
            debug!("Creating directory '{}'", target.display());
            fs::create_dir_all(target)?;
        }
        NodeContent::Rendered(text) => {
            debug!("Writing file '{}'", target.display());
            fs::write(target, text)?;
        }
        NodeContent::Copied(source) => {
            debug!("Copying file '{}'", target.display());
            fs::copy(source, target)?;
        }
    }
    Ok(())
}
