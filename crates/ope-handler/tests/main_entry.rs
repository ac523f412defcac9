//! End-to-end tests for the ope-handler binary.
//!
//! These run the compiled handler with an explicit companion override so no
//! bundle layout is needed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

fn handler() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ope-handler"));
    command.env_remove("OPE_COMPANION").env_remove("OPE_GRACE_MS");
    command
}

fn write_recorder(dir: &Path) -> (PathBuf, PathBuf) {
    let record = dir.join("args.txt");
    let script = dir.join("ope");
    let body = format!(
        "#!/bin/sh\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\" >> '{}'; done\nexit 1\n",
        record.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script, record)
}

#[test]
fn test_url_argument_is_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let (script, record) = write_recorder(dir.path());

    let status = handler()
        .arg("--companion")
        .arg(&script)
        .args(["--grace-ms", "10", "ope:///Users/alice/notes.txt"])
        .status()
        .unwrap();

    // The companion's failure is not the handler's failure.
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&record).unwrap(),
        "ope:///Users/alice/notes.txt\n"
    );
}

#[test]
fn test_companion_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let (script, record) = write_recorder(dir.path());

    let status = handler()
        .env("OPE_COMPANION", &script)
        .env("OPE_GRACE_MS", "10")
        .arg("ope://localhost/tmp")
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(&record).unwrap(), "ope://localhost/tmp\n");
}

#[test]
fn test_missing_companion_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();

    let started = Instant::now();
    let status = handler()
        .arg("--companion")
        .arg(dir.path().join("missing"))
        .args(["--grace-ms", "100", "ope:///tmp"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(started.elapsed() >= Duration::from_millis(100));
}

// macOS waits for an Apple Event when no URL is given.
#[cfg(not(target_os = "macos"))]
#[test]
fn test_no_url_exits_without_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let (script, record) = write_recorder(dir.path());

    let status = handler()
        .arg("--companion")
        .arg(&script)
        .args(["--grace-ms", "10"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(!record.exists());
}

#[test]
fn test_locate_json_reports_override() {
    let dir = tempfile::tempdir().unwrap();
    let (script, _) = write_recorder(dir.path());

    let output = handler()
        .args(["locate", "--json", "--companion"])
        .arg(&script)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["companion"], script.display().to_string());
    assert_eq!(report["exists"], true);
    assert_eq!(report["overridden"], true);
}

#[test]
fn test_locate_fails_for_missing_companion() {
    let dir = tempfile::tempdir().unwrap();

    let output = handler()
        .args(["locate", "--companion"])
        .arg(dir.path().join("missing"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("missing"));
}

fn located_companion(cwd: &Path, extra: &[&str]) -> serde_json::Value {
    let output = handler()
        .args(["locate", "--json"])
        .args(extra)
        .current_dir(cwd)
        .output()
        .unwrap();
    // A missing companion fails the command but the report is still printed.
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["companion"].clone()
}

#[test]
fn test_locate_is_independent_of_working_directory() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let from_first = located_companion(first.path(), &[]);
    let from_second = located_companion(second.path(), &[]);

    assert_eq!(from_first, from_second);
    let companion = PathBuf::from(from_first.as_str().unwrap());
    assert!(companion.is_absolute());
    assert!(!companion.starts_with(first.path()));
}

#[test]
fn test_relative_override_is_independent_of_working_directory() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let from_first = located_companion(first.path(), &["--companion", "libexec/ope"]);
    let from_second = located_companion(second.path(), &["--companion", "libexec/ope"]);

    assert_eq!(from_first, from_second);
    let companion = PathBuf::from(from_first.as_str().unwrap());
    assert!(companion.ends_with("libexec/ope"));
    assert!(!companion.starts_with(first.path()));
    assert!(!companion.starts_with(second.path()));
}
