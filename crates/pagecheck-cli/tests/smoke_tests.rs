//! Smoke tests for the pagecheck CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the pagecheck binary
fn pagecheck() -> Command {
    let mut cmd = Command::cargo_bin("pagecheck").expect("pagecheck binary should exist");
    cmd.env_remove("RUST_LOG").env_remove("PAGECHECK_CONFIG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    pagecheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    pagecheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    pagecheck().assert().failure();
}

#[test]
fn test_run_help_lists_flags() {
    pagecheck()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--driver"))
        .stdout(predicate::str::contains("--report"));
}

// ============================================================================
// list / config
// ============================================================================

#[test]
fn test_list_prints_catalogue() {
    pagecheck()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("open_home_page"))
        .stdout(predicate::str::contains("download_progress"))
        .stdout(predicate::str::contains("clear_form"));
}

#[test]
fn test_config_prints_yaml_with_overrides() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pagecheck.yaml");
    fs::write(&path, "timeout_ms: 1234\nviewport_width: 800\n").unwrap();

    pagecheck()
        .args(["config", "--config"])
        .arg(&path)
        .args(["--poll-ms", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_ms: 1234"))
        .stdout(predicate::str::contains("poll_interval_ms: 25"))
        .stdout(predicate::str::contains("viewport_width: 800"));
}

#[test]
fn test_config_rejects_bad_yaml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.yaml");
    fs::write(&path, "timeout_ms: [not, a, number]\n").unwrap();

    pagecheck()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_full_catalogue_simulated() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");

    pagecheck()
        .current_dir(temp.path())
        .args(["run", "--color", "never", "--poll-ms", "5", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED 16 scenarios"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 16);
    assert!(temp.path().join("screenshots").join("title").join("01_open_home_page.png").exists());
}

#[test]
fn test_run_filter_and_screenshot_dir() {
    let temp = TempDir::new().unwrap();
    let shots = temp.path().join("shots");

    pagecheck()
        .args(["run", "--color", "never", "--filter", "submit_form", "--screenshots"])
        .arg(&shots)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASS submit_form"))
        .stderr(predicate::str::contains("PASSED 1 scenarios"));

    assert!(shots.join("submit_form").join("01_form_filled.png").exists());
}

#[test]
fn test_run_unknown_filter_fails() {
    pagecheck()
        .args(["run", "--no-screenshots", "--filter", "nothing_matches_this"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenario matches"));
}

#[test]
fn test_run_quiet_prints_nothing_on_success() {
    pagecheck()
        .args(["run", "-q", "--no-screenshots", "--filter", "h1"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_json_logs() {
    pagecheck()
        .args(["run", "-v", "--log-json", "--no-screenshots", "--filter", "only_single_h1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"scenario started\""));
}
