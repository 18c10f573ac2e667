//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any resolution or validation failure
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;

#[test]
fn test_exit_code_success() {
    let fixture = TestFixture::new().with_document(documents::TWO_VERSIONS);

    fixture
        .configure()
        .args(["--init", "--product", "board"])
        .assert()
        .code(0);
}

#[test]
fn test_exit_code_help() {
    TestFixture::new().command().arg("--help").assert().code(0);
}

#[test]
fn test_exit_code_version() {
    TestFixture::new().command().arg("--version").assert().code(0);
}

#[test]
fn test_exit_code_list_without_selection() {
    let fixture = TestFixture::new().with_document(documents::TWO_VERSIONS);

    fixture
        .command()
        .args(["configure", "--list"])
        .assert()
        .code(0);
}

#[test]
fn test_exit_code_error_missing_selection() {
    let document = documents::TWO_VERSIONS.replace("  mode: debug\n", "");
    let fixture = TestFixture::new().with_document(&document);

    fixture
        .configure()
        .args(["--init", "--product", "board"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mode"));
}

#[test]
fn test_exit_code_error_document_not_found() {
    TestFixture::new()
        .command()
        .args(["validate", "nonexistent.yaml"])
        .assert()
        .code(1);
}

#[test]
fn test_exit_code_usage_unknown_flag() {
    TestFixture::new()
        .command()
        .args(["configure", "--unknown-flag-that-does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_exit_code_usage_unknown_subcommand() {
    TestFixture::new()
        .command()
        .arg("unknown-subcommand-xyz")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}
