//! CLI smoke tests
//!
//! Exercises the binary surface without a server: help and version
//! output, and argument validation.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("murmur").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("murmur").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("murmur"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("murmur").unwrap();
    cmd.arg("definitely-not-a-command").assert().failure();
}

#[test]
fn test_ask_requires_prompt() {
    let mut cmd = Command::cargo_bin("murmur").unwrap();
    cmd.arg("ask").assert().failure();
}
