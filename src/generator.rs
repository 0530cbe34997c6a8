//! Phase orchestration: answers, validation, rendering, cleanup,
//! initialization. Phases run strictly in that order.

use crate::answers::{get_answers, Answers};
use crate::cleanser::{CleanupReport, Cleanser};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ignore::{copy_without_render_set, ignore_set};
use crate::initializer::Initializer;
use crate::processor::{ensure_output_dir, materialize, Processor};
use crate::prompt::Prompter;
use crate::renderer::BlockRenderer;
use crate::validate::{Finding, Validator};
use crate::variables::Configuration;
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Options {
    pub output_dir: PathBuf,
    /// Allow writing into an existing output directory.
    pub force: bool,
    /// Ask questions that no preloaded answer covers.
    pub interactive: bool,
    pub keep_empty_files: bool,
    /// Run the initializer phase.
    pub initialize: bool,
}

impl Options {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            force: false,
            interactive: false,
            keep_empty_files: false,
            initialize: true,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct Generation {
    pub output_root: PathBuf,
    pub configuration: Configuration,
    /// Non-fatal validation findings.
    pub warnings: Vec<Finding>,
    /// Number of nodes written before cleanup.
    pub written: usize,
    /// Number of nodes that could not be written.
    pub failed_writes: usize,
    pub cleanup: CleanupReport,
}

/// Generates a project from the template in `template_dir`.
///
/// Every error this returns is raised before the output directory is
/// touched, except failing to create the output directory itself.
/// Failures from materialization onwards are logged, not returned.
///
/// # Arguments
/// * `template_dir` - Template root holding the manifest
/// * `config` - Manifest loaded from `template_dir`
/// * `preloaded` - Answers from a file, stdin or `--set`
/// * `prompt` - Prompter for questions no preloaded answer covers
/// * `options` - Output directory and phase switches
///
/// # Returns
/// * `Result<Generation>` - Summary of the run
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the output exists without `force`
/// * `Error::TemplateDoesNotExistsError` if the template tree is missing
/// * `Error::ValidationError` if the configuration is rejected
pub fn generate(
    template_dir: &Path,
    config: &Config,
    preloaded: &Answers,
    prompt: &dyn Prompter,
    options: &Options,
) -> Result<Generation> {
    let engine = BlockRenderer::new();
    let output_root = ensure_output_dir(&options.output_dir, options.force)?;

    let template_tree = config.template_tree(template_dir);
    if !template_tree.is_dir() {
        return Err(Error::TemplateDoesNotExistsError {
            template_dir: template_tree.display().to_string(),
        });
    }
    let ignored = ignore_set(config)?;
    let verbatim = copy_without_render_set(config)?;

    let configuration = get_answers(config, &engine, prompt, preloaded, options.interactive)?;

    println!("Validating project configuration...");
    let warnings = Validator::new(config).validate(&configuration)?;
    for finding in &warnings {
        warn!("{}", finding);
    }

    let context = configuration.context(&engine)?;
    info!("Resolved context: {}", context);

    let processor = Processor::new(&engine, &template_tree, &context, &ignored, &verbatim);
    let nodes = processor.render_tree();
    let failed_writes = materialize(&output_root, &nodes)?;
    if failed_writes > 0 {
        warn!("{} of {} entries could not be written", failed_writes, nodes.len());
    }

    println!("Cleaning up unused files...");
    let cleanup = Cleanser::new(&engine, config, &context)
        .keep_empty_files(options.keep_empty_files)
        .run(&output_root);

    if options.initialize {
        Initializer::new(&engine, &config.initializer, &context).run(&output_root);
    }

    Ok(Generation {
        output_root,
        configuration,
        warnings,
        written: nodes.len() - failed_writes,
        failed_writes,
        cleanup,
    })
}
