#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_equivex-cli"))
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn compare(subject: &PathBuf, expectation: &PathBuf, extra: &[&str]) -> Output {
    bin()
        .arg("compare")
        .arg(subject)
        .arg(expectation)
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn test_equivalent_documents_exit_zero() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"name": "Ada", "tags": ["x", "y"]}"#);
    let b = write(&dir, "b.json", r#"{"tags": ["y", "x"], "name": "Ada"}"#);

    let output = compare(&a, &b, &[]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "equivalent");
}

#[test]
fn test_differences_exit_one_with_a_line_each() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"name": "Ada", "age": 36}"#);
    let b = write(&dir, "b.json", r#"{"name": "Bob", "age": 37}"#);

    let output = compare(&a, &b, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim().lines().count(), 2);
    assert!(stdout.contains("age"));
}

#[test]
fn test_because_is_rendered() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"v": 1}"#);
    let b = write(&dir, "b.json", r#"{"v": 2}"#);

    let output = compare(&a, &b, &["--because", "versions are pinned"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("because versions are pinned"));
}

#[test]
fn test_flags_relax_the_comparison() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"id": 1, "stamp": "x", "extra": true}"#);
    let b = write(&dir, "b.json", r#"{"id": 1, "stamp": "y"}"#);

    assert_eq!(compare(&a, &b, &[]).status.code(), Some(1));
    let output = compare(&a, &b, &["--exclude", "stamp", "--excluding-missing-members"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_strict_ordering_flag() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", "[1, 2, 3]");
    let b = write(&dir, "b.json", "[3, 2, 1]");

    assert_eq!(compare(&a, &b, &[]).status.code(), Some(0));
    assert_eq!(compare(&a, &b, &["--strict-ordering"]).status.code(), Some(1));
}

#[test]
fn test_profile_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"id": 1, "audit": "x"}"#);
    let b = write(&dir, "b.json", r#"{"id": 1, "audit": "y"}"#);
    let profile = write(&dir, "profile.yaml", "excluded_paths:\n  - audit\n");

    let output = compare(&a, &b, &["--profile", profile.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_errors_exit_two() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"id": 1}"#);
    let broken = write(&dir, "broken.json", "{not json");
    let missing = dir.path().join("missing.json");

    let output = compare(&a, &broken, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_INPUT"));

    let output = compare(&a, &missing, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_IO"));

    let bad_profile = write(&dir, "bad.yaml", "max_depth: deep\n");
    let output = compare(&a, &a, &["--profile", bad_profile.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_PROFILE"));
}

#[test]
fn test_options_command_prints_effective_rules() {
    let output = bin()
        .args(["options", "--enums-by-name", "--exclude", "Audit", "--strict-ordering"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Compare enums by name"));
    assert!(stdout.contains("Exclude member Audit"));
}
