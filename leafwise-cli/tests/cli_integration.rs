//! CLI integration tests for leafwise-cli.
//!
//! These run the actual binary and check outputs, exit codes, and the
//! persisted history file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command for the leafwise binary.
fn leafwise() -> Command {
    Command::cargo_bin("leafwise").unwrap()
}

/// Write a small valid PNG under the given directory.
fn write_leaf_png(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("leaf.png");
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([30, 140, 60, 255]));
    img.save(&path).unwrap();
    path
}

#[test]
fn test_help_displays_usage() {
    leafwise()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plant leaf disease diagnosis"))
        .stdout(predicate::str::contains("diagnose"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_help_shows_exit_codes() {
    leafwise()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("66"))
        .stdout(predicate::str::contains("69"));
}

#[test]
fn test_version_displays_version() {
    leafwise()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("leafwise"));
}

#[test]
fn test_diagnose_missing_file_exits_with_input_error() {
    let dir = TempDir::new().unwrap();
    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", "does-not-exist.png", "--mock"])
        .assert()
        .failure()
        .code(66);
}

#[test]
fn test_diagnose_non_image_exits_with_input_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "not an image").unwrap();

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", path.to_str().unwrap(), "--mock"])
        .assert()
        .failure()
        .code(66)
        .stderr(predicate::str::contains("not a recognizable image"));
}

#[test]
fn test_mock_diagnose_prints_a_result() {
    let dir = TempDir::new().unwrap();
    let leaf = write_leaf_png(&dir);

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", leaf.to_str().unwrap(), "--mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Diagnosis complete"))
        .stdout(predicate::str::contains("Maize Common Rust"))
        .stdout(predicate::str::contains("92%"));
}

#[test]
fn test_mock_diagnose_records_history() {
    let dir = TempDir::new().unwrap();
    let leaf = write_leaf_png(&dir);

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", leaf.to_str().unwrap(), "--mock"])
        .assert()
        .success();

    assert!(dir.path().join("leafwise.history.json").exists());

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Maize Common Rust"))
        .stdout(predicate::str::contains("Showing 1 most recent analyses."));
}

#[test]
fn test_no_history_flag_skips_recording() {
    let dir = TempDir::new().unwrap();
    let leaf = write_leaf_png(&dir);

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", leaf.to_str().unwrap(), "--mock", "--no-history"])
        .assert()
        .success();

    assert!(!dir.path().join("leafwise.history.json").exists());
}

#[test]
fn test_history_list_when_empty() {
    let dir = TempDir::new().unwrap();
    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No analysis history yet."));
}

#[test]
fn test_history_clear_removes_entries() {
    let dir = TempDir::new().unwrap();
    let leaf = write_leaf_png(&dir);

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["diagnose", leaf.to_str().unwrap(), "--mock"])
        .assert()
        .success();

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["history", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis history cleared."));

    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No analysis history yet."));
}

#[test]
fn test_history_show_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    leafwise()
        .args(["--data-dir", dir.path().to_str().unwrap()])
        .args(["history", "show", "missing-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no history entry with id"));
}
