use clap::Parser;
use pybake::cli::Args;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("pybake")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.template, "./template");
    assert_eq!(parsed.output_dir, PathBuf::from("./output"));
    assert!(!parsed.force);
    assert!(!parsed.verbose);
    assert!(!parsed.stdin);
    assert!(!parsed.no_input);
    assert!(!parsed.no_init);
    assert!(!parsed.keep_empty_files);
    assert!(parsed.answers_file.is_none());
    assert!(parsed.set.is_empty());
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--force",
        "--verbose",
        "--stdin",
        "--no-input",
        "--skip-overwrite-check",
        "--no-init",
        "--keep-empty-files",
        "--answers-file",
        "answers.json",
        "./template",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert!(parsed.stdin);
    assert!(parsed.no_input);
    assert!(parsed.skip_overwrite_check);
    assert!(parsed.no_init);
    assert!(parsed.keep_empty_files);
    assert_eq!(parsed.answers_file, Some(PathBuf::from("answers.json")));
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-v", "-s", "-a", "a.json", "./template", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert!(parsed.stdin);
    assert_eq!(parsed.answers_file, Some(PathBuf::from("a.json")));
}

#[test]
fn test_repeated_set() {
    let args = make_args(&[
        "--set",
        "project_type=cli",
        "--set",
        "use_docker=n",
        "./template",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.set, vec!["project_type=cli", "use_docker=n"]);
}

#[test]
fn test_missing_required_args() {
    let args = make_args(&[]);
    assert!(Args::try_parse_from(args).is_err());

    let args = make_args(&["./template"]);
    assert!(Args::try_parse_from(args).is_err());
}
