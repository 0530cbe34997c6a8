//! pybake generates Python project skeletons (a FastAPI service or a CLI)
//! from a template directory and a flat set of answers, then prunes the
//! result and initializes the new project.

/// Answer collection from defaults, files, overrides and prompts
pub mod answers;

/// Post-generation pruning of the output tree
pub mod cleanser;

/// Command-line interface module for the pybake application
pub mod cli;

/// Template manifest handling
/// Supports JSON and YAML formats (pybake.json, pybake.yml, pybake.yaml)
pub mod config;

/// Error types and handling for the pybake application
pub mod error;

/// Runs the generation phases in order
pub mod generator;

/// Ignore and copy-without-render patterns
pub mod ignore;

/// Git, hook manager and directory setup of the generated project
pub mod initializer;

/// Template sources: local directories and git repositories
pub mod loader;

/// Template tree rendering and materialization
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Template rendering engine built on MiniJinja
pub mod renderer;

/// Pre-generation configuration checks
pub mod validate;

/// Resolved answers and derived values
pub mod variables;
