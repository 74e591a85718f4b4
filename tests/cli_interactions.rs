//! CLI options interaction tests
//!
//! These tests run the binary without network access: configuration errors,
//! pipeline generation and topic help.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a test command isolated from the caller's environment
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reachability-rerun").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("REACHABILITY_PROJECT")
        .env_remove("REACHABILITY_LOCATION")
        .env_remove("REACHABILITY_TESTS")
        .env_remove("REACHABILITY_TOKEN")
        .env_remove("REACHABILITY_ENDPOINT")
        .env_remove("POLL_INTERVAL_MS")
        .env_remove("POLL_TIMEOUT_SECONDS")
        .env_remove("ENABLE_COLOR")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_missing_project() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please provide a project name"));
}

#[test]
fn test_project_from_env_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "REACHABILITY_PROJECT=from-dotenv\n").unwrap();

    create_test_cmd(&dir)
        .arg("--gen")
        .arg("circleci")
        .assert()
        .success()
        .stdout(predicate::str::contains("--project=from-dotenv"));
}

#[test]
fn test_gen_circleci() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--project", "my-project", "--gen", "circleci"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("version: 2\n"))
        .stdout(predicate::str::contains("- image: google/cloud-sdk"))
        .stdout(predicate::str::contains("echo $GCLOUD_SERVICE_KEY > key.json"))
        .stdout(predicate::str::contains(format!(
            "https://storage.googleapis.com/jbd-releases/reachability-rerun-linux-amd64-v{}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("--project=my-project"));
}

#[test]
fn test_gen_travis_requires_secret_key() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--project", "my-project", "--gen", "travis"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--secretkey cannot be empty; provide a Google Cloud secret key"));
}

#[test]
fn test_gen_travis_without_travis_cli() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("key.json"), "{}").unwrap();

    create_test_cmd(&dir)
        .args(["--project", "my-project", "--gen", "travis", "--secretkey", "key.json"])
        .env("PATH", dir.path())
        .assert()
        .code(5)
        .stderr(predicate::str::contains("travis command is not installed"));
}

#[test]
fn test_unsupported_gen_target() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--project", "my-project", "--gen", "jenkins"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported gen target \"jenkins\""));
}

#[test]
fn test_invalid_poll_settings() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--project", "p", "--poll-interval-ms", "0"])
        .assert()
        .code(1);

    create_test_cmd(&dir)
        .args(["--project", "p", "--poll-timeout", "100000"])
        .assert()
        .code(1);

    create_test_cmd(&dir)
        .args(["--project", "p", "--poll-interval-ms", "soon"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_usage_errors_exit_like_config_errors() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--project", "p", "--no-such-flag"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--no-such-flag"));
}

#[test]
fn test_single_dash_long_flags() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["-project=dash-project", "-gen", "circleci"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--project=dash-project"));
}

#[test]
fn test_help_topics() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--help-topic", "gen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("travis encrypt-file"));

    create_test_cmd(&dir)
        .args(["--help-topic", "exit-codes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REACHABLE"));

    create_test_cmd(&dir)
        .args(["--help-topic", "nonsense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown help topic"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
