#![allow(deprecated)] // Command::cargo_bin

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command with keys and config pinned inside `workdir`
fn pemcrypt(workdir: &Path) -> Command {
    let (public_path, private_path) = common::write_key_pair(workdir);
    let config_path = workdir.join("config.json");
    fs::write(&config_path, "{}").unwrap();

    let mut cmd = Command::cargo_bin("pemcrypt").unwrap();
    cmd.arg("--config")
        .arg(&config_path)
        .arg("--public-key")
        .arg(public_path)
        .arg("--private-key")
        .arg(private_path)
        .env_remove("RUST_LOG")
        .env_remove("PEMCRYPT_PUBLIC_KEY")
        .env_remove("PEMCRYPT_PRIVATE_KEY");
    cmd
}

fn sample_tree(root: &Path) -> std::path::PathBuf {
    let data = root.join("data");
    fs::create_dir_all(data.join("sub")).unwrap();
    fs::write(data.join("a.txt"), "hello").unwrap();
    fs::write(data.join("sub/b.txt"), "world").unwrap();
    data
}

#[test]
fn test_cli_roundtrip() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    pemcrypt(work.path())
        .arg(&data)
        .arg("--encrypt")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypting"));

    assert!(fs::read(data.join("a.txt")).unwrap().starts_with(b"RSAF1"));

    pemcrypt(work.path())
        .arg(&data)
        .arg("-d")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(data.join("sub/b.txt")).unwrap(), "world");
}

#[test]
fn test_cli_both_flags_rejected_before_mutation() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    pemcrypt(work.path())
        .arg(&data)
        .arg("-e")
        .arg("-d")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("only one of"));

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
}

#[test]
fn test_cli_flag_error_reported_before_config() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    // The flag conflict wins over the unreadable config file
    Command::cargo_bin("pemcrypt")
        .unwrap()
        .arg(&data)
        .arg("-e")
        .arg("-d")
        .arg("--config")
        .arg(work.path().join("missing.json"))
        .env_remove("RUST_LOG")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("only one of"))
        .stdout(predicate::str::contains("missing.json").not());

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
}

#[test]
fn test_cli_no_flag_rejected() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    pemcrypt(work.path()).arg(&data).assert().code(2);

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
}

#[test]
fn test_cli_missing_path() {
    let work = TempDir::new().unwrap();

    pemcrypt(work.path())
        .arg(work.path().join("missing"))
        .arg("-e")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Path not found"));
}

#[test]
fn test_cli_partial_failure_exit_code() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    // Nothing was encrypted, so every file fails to decrypt
    pemcrypt(work.path())
        .arg(&data)
        .arg("--decrypt")
        .assert()
        .code(1);

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
}

#[test]
fn test_cli_dry_run() {
    let work = TempDir::new().unwrap();
    let data = sample_tree(work.path());

    pemcrypt(work.path())
        .arg(&data)
        .arg("--encrypt")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    assert_eq!(fs::read_to_string(data.join("a.txt")).unwrap(), "hello");
}
