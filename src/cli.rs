//! Command-line interface implementation for pybake.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for pybake.
#[derive(Parser, Debug)]
#[command(author, version, about = "pybake: Python project scaffolding tool", long_about = None)]
pub struct Args {
    /// Path to the template directory or git repository URL
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Force writing into an existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Read answers as a JSON object from a file
    #[arg(short, long, value_name = "PATH")]
    pub answers_file: Option<PathBuf>,

    /// Set a single answer, e.g. --set project_type=cli. May be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Never prompt; use defaults for anything not answered
    #[arg(long)]
    pub no_input: bool,

    /// Replace an existing clone of a git template without asking
    #[arg(long)]
    pub skip_overwrite_check: bool,

    /// Skip git, hook and directory initialization of the generated project
    #[arg(long)]
    pub no_init: bool,

    /// Keep files that rendered empty
    #[arg(long)]
    pub keep_empty_files: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let mut command = Args::command().help_template(
                    r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                );
                if let Err(io_err) = command.print_help() {
                    eprintln!("{}", io_err);
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
