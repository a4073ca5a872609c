//! Smoke tests for the `garrison` binary.
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_lifecycle_commands() {
    Command::cargo_bin("garrison")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_exec_requires_a_command() {
    Command::cargo_bin("garrison")
        .unwrap()
        .args(["exec", "lab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_remove_requires_a_name() {
    Command::cargo_bin("garrison")
        .unwrap()
        .arg("remove")
        .assert()
        .failure();
}
