//! Profile load/save through the CLI (non-interactive paths only).
//!
//! Each test points the child's XDG_CONFIG_HOME at its own temp dir, so nothing here
//! touches the real config or this process's environment.
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

fn run_qsdash(xdg: &Path, args: &[&str]) -> (bool, String) {
    let output = Command::cargo_bin("qsdash")
        .unwrap()
        .env("XDG_CONFIG_HOME", xdg)
        .env_remove("QSDASH_API_URL")
        .args(args)
        .write_stdin("")
        .output()
        .expect("run qsdash");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

fn profiles_path(xdg: &Path) -> PathBuf {
    xdg.join("qsdash").join("profiles.json")
}

#[test]
fn profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    let (ok, out) = run_qsdash(
        td.path(),
        &["--profile", "unittest", "http://example:8000", "--dry-run"],
    );
    assert!(ok, "{out}");
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(data.contains("unittest"), "profiles.json missing profile entry: {data}");
    assert!(data.contains("http://example:8000"));
}

#[test]
fn profile_overwrite_only_when_changed() {
    let td = tempfile::tempdir().unwrap();
    run_qsdash(td.path(), &["--profile", "prod", "http://one:8000", "--dry-run"]);
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();

    run_qsdash(td.path(), &["--profile", "prod", "http://one:8000", "--dry-run"]);
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");

    // changed URL without --save: the prompt reads an empty line and declines
    run_qsdash(td.path(), &["--profile", "prod", "http://two:8000", "--dry-run"]);
    let declined = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(declined.contains("one"), "{declined}");

    run_qsdash(
        td.path(),
        &["--profile", "prod", "--save", "http://two:8000", "--dry-run"],
    );
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(third.contains("two"), "Updated URL not written: {third}");
}

#[test]
fn profile_tls_ca_persisted_and_loaded() {
    let td = tempfile::tempdir().unwrap();
    run_qsdash(
        td.path(),
        &[
            "--profile",
            "secureX",
            "--tls-ca",
            "/tmp/cert.pem",
            "https://host:8443",
            "--dry-run",
        ],
    );
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("secureX"));
    assert!(data.contains("cert.pem"));

    // name only: loaded from the file
    let (ok, out) = run_qsdash(td.path(), &["-P", "secureX", "--dry-run"]);
    assert!(ok, "{out}");
    assert!(out.contains("url=https://host:8443"), "{out}");
    assert!(out.contains("tls_ca=/tmp/cert.pem"), "{out}");
}

#[test]
fn unknown_profile_with_empty_answer_aborts() {
    let td = tempfile::tempdir().unwrap();
    let (ok, out) = run_qsdash(td.path(), &["-P", "nosuch", "--dry-run"]);
    assert!(ok);
    assert!(out.contains("does not exist yet"), "{out}");
    assert!(!out.contains("url="), "{out}");
    assert!(!profiles_path(td.path()).exists());
}
