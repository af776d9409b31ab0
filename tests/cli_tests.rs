//! Integration tests for the gazeta CLI surface

mod common;

use common::gazeta;
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    gazeta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: gazeta"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("rotate"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_version_flag() {
    gazeta()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gazeta"));
}

#[test]
fn test_subcommand_help() {
    gazeta()
        .args(["rotate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--retention-days"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_unknown_format_exit_code_2() {
    gazeta()
        .args(["--format", "invalid", "verify"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_subcommand_exit_code_2() {
    gazeta().arg("frobnicate").assert().code(2);
}

#[test]
fn test_json_error_envelope_for_usage_errors() {
    let output = gazeta()
        .args(["--format", "json", "frobnicate"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["error"]["code"], 2);
    assert_eq!(envelope["error"]["type"], "usage_error");
}

#[test]
fn test_invalid_current_date_exit_code_2() {
    let dir = tempfile::tempdir().unwrap();
    gazeta()
        .arg("--root")
        .arg(dir.path())
        .args(["rotate", "--current-date", "soon"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--current-date"));
}

#[test]
fn test_list_rejects_page_zero() {
    let dir = tempfile::tempdir().unwrap();
    gazeta()
        .arg("--root")
        .arg(dir.path())
        .args(["list", "index", "--page", "0"])
        .assert()
        .code(2);
}
