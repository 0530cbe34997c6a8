//! pybake's entry point: argument parsing, logging setup and error reporting.

use std::io::IsTerminal;

use pybake::{
    answers::get_preloaded_answers,
    cli::{get_args, Args},
    config::get_config,
    error::{default_error_handler, Result},
    generator::{generate, Options},
    loader::load_template,
    prompt::DialoguerPrompter,
};

fn main() {
    let args = get_args();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let prompt = DialoguerPrompter::new();

    let template_dir = load_template(&prompt, &args.template, args.skip_overwrite_check)?;
    let config = get_config(&template_dir)?;
    let preloaded = get_preloaded_answers(args.stdin, args.answers_file.as_deref(), &args.set)?;

    let options = Options {
        output_dir: args.output_dir,
        force: args.force,
        interactive: !args.no_input && !args.stdin && std::io::stdin().is_terminal(),
        keep_empty_files: args.keep_empty_files,
        initialize: !args.no_init,
    };
    let generation = generate(&template_dir, &config, &preloaded, &prompt, &options)?;

    println!(
        "Template generation completed successfully in {}.",
        generation.output_root.display()
    );
    Ok(())
}
