//! CLI help and argument-parsing specs.

use crate::prelude::cli;

#[test]
fn no_args_shows_usage_and_fails() {
    cli().assert().failure().stderr(predicates::str::contains("Usage:"));
}

#[test]
fn help_flag_shows_usage() {
    cli().arg("--help").assert().success().stdout(predicates::str::contains("Usage:"));
}

#[test]
fn help_lists_every_subcommand() {
    let assert = cli().arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for sub in ["run", "list", "stop", "start", "destroy", "info", "setup", "doctor", "init"] {
        assert!(stdout.contains(sub), "missing subcommand `{sub}` in help output:\n{stdout}");
    }
}

#[test]
fn run_help_shows_usage() {
    cli()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage:"));
}

#[test]
fn unknown_subcommand_fails() {
    cli().arg("bogus-command").assert().failure();
}
