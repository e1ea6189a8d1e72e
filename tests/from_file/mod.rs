//! Integration tests running the actual crate binary against fixture files: the full E2E path.

use std::path::Path;
use std::process::{Command, Output};

use crate::fixture_path;

fn run_binary(input: &Path, store: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bulk-import"))
        .arg("--input")
        .arg(input)
        .arg("--store")
        .arg(format!("file://{}", store.display()))
        .arg("--batch-size")
        .arg("2")
        .output()
        .expect("failed to execute binary")
}

#[test]
fn partial_failures_still_exit_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("customers.json");

    let output = run_binary(&fixture_path("customers_with_errors.csv"), &store);

    assert!(
        output.status.success(),
        "binary exited with non-zero status.\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("binary output was not valid UTF-8");
    assert_eq!(stdout.trim(), "customers: 3 imported, 3 failed");
    assert!(store.exists(), "store file was not written");
}

#[test]
fn rerun_against_the_same_store_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("customers.json");

    let first = run_binary(&fixture_path("customers.csv"), &store);
    let second = run_binary(&fixture_path("customers.csv"), &store);

    assert_eq!(
        String::from_utf8_lossy(&first.stdout).trim(),
        "customers: 7 imported, 0 failed"
    );
    assert_eq!(
        String::from_utf8_lossy(&second.stdout).trim(),
        "customers: 0 imported, 7 failed"
    );
}

#[test]
fn missing_input_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_binary(&dir.path().join("nope.csv"), &dir.path().join("store.json"));

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn unreachable_store_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_binary(
        &fixture_path("customers.csv"),
        &dir.path().join("missing_dir").join("store.json"),
    );

    assert!(!output.status.success());
}

#[test]
fn debug_level_out_of_range_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_bulk-import"))
        .args(["--input", "whatever.csv", "--debug", "4"])
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
}
