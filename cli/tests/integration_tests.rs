use std::fs;
use std::path::Path;
use std::process::Command;

use param_tree_core::ParamTree;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_param-inspect"))
}

fn write_tree(dir: &Path, name: &str, tree: &ParamTree) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(tree).unwrap()).expect("failed to write tree");
    path
}

fn sample_defaults() -> ParamTree {
    let mut defaults = ParamTree::new();
    defaults.set_value("threads", 1i64, "Worker threads");
    defaults.set_min_int("threads", 1).unwrap();
    defaults.set_value("io:format", "mzML", "Output format");
    defaults
        .set_valid_strings("io:format", &["mzML", "mzXML"])
        .unwrap();
    defaults
        .set_section_description("io", "Input/output settings")
        .unwrap();
    defaults
}

#[test]
fn parse_ingests_tokens_and_prints_json() {
    let output = bin()
        .args(["parse", "--prefix", "cli", "--", "-in", "a.raw", "-out", "b.txt", "rest"])
        .output()
        .expect("failed to run param-inspect");

    assert!(output.status.success());
    let tree: ParamTree = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(*tree.get_value("cli:-in").unwrap(), "a.raw");
    assert_eq!(*tree.get_value("cli:-out").unwrap(), "b.txt");
    assert_eq!(
        tree.get_value("cli:misc").unwrap().as_str_list().unwrap(),
        ["rest"]
    );
}

#[test]
fn show_renders_sections_with_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path(), "tree.json", &sample_defaults());

    let output = bin()
        .args(["show", "--input", input.to_str().unwrap()])
        .output()
        .expect("failed to run param-inspect");

    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.contains("threads = 1"));
    assert!(listing.contains("io  # Input/output settings"));
    assert!(listing.contains("  format = mzML"));
}

#[test]
fn show_section_restricts_to_a_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path(), "tree.json", &sample_defaults());

    let output = bin()
        .args([
            "show",
            "--input",
            input.to_str().unwrap(),
            "--section",
            "io",
        ])
        .output()
        .expect("failed to run param-inspect");

    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.contains("format = mzML"));
    assert!(!listing.contains("threads"));
}

#[test]
fn show_fails_on_missing_section() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tree(dir.path(), "tree.json", &sample_defaults());

    let output = bin()
        .args([
            "show",
            "--input",
            input.to_str().unwrap(),
            "--section",
            "nope",
        ])
        .output()
        .expect("failed to run param-inspect");

    assert!(!output.status.success());
}

#[test]
fn check_passes_on_a_clean_tree() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = write_tree(dir.path(), "defaults.json", &sample_defaults());

    let mut config = ParamTree::new();
    config.set_value("threads", 8i64, "");
    config.set_value("io:format", "mzXML", "");
    let input = write_tree(dir.path(), "config.json", &config);

    let output = bin()
        .args([
            "check",
            "--input",
            input.to_str().unwrap(),
            "--defaults",
            defaults.to_str().unwrap(),
            "--tool",
            "mytool",
        ])
        .output()
        .expect("failed to run param-inspect");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("OK"));
}

#[test]
fn check_reports_problems_and_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = write_tree(dir.path(), "defaults.json", &sample_defaults());

    let mut config = ParamTree::new();
    config.set_value("threads", 0i64, "");
    config.set_value("typo", 1i64, "");
    let input = write_tree(dir.path(), "config.json", &config);

    let output = bin()
        .args([
            "check",
            "--input",
            input.to_str().unwrap(),
            "--defaults",
            defaults.to_str().unwrap(),
            "--tool",
            "mytool",
        ])
        .output()
        .expect("failed to run param-inspect");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unknown parameter 'typo'"));
    assert!(stdout.contains("invalid value for parameter 'threads'"));
}
