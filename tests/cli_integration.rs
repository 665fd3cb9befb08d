// CLI integration tests against a staged copy of the reference provider.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use serde_json::Value;
use xfce4util_probe::{PATH_ENV, Requirement};

fn cmd() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_xfce4util-probe"));
    command
        .env_remove(PATH_ENV)
        .env_remove("RUST_LOG")
        .env_remove("LC_ALL")
        .env_remove("LC_MESSAGES")
        .env_remove("LANG");
    command
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn parse_json_line(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().expect("json line");
    parse_json(line)
}

// The crate's own cdylib, staged under the exact soname the probe resolves.
fn stage_fixture(dir: &Path) {
    let soname = Requirement::util().candidate_names().expect("registered")[0];
    fs::copy(built_cdylib_path(), dir.join(soname)).expect("stage fixture");
}

fn built_cdylib_path() -> PathBuf {
    let exe = PathBuf::from(env!("CARGO_BIN_EXE_xfce4util-probe"));
    let debug_dir = exe.parent().expect("target dir").to_path_buf();
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for root in [debug_dir.clone(), debug_dir.join("deps")] {
        let Ok(entries) = fs::read_dir(&root) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("libxfce4util_probe")
                || !name.ends_with(std::env::consts::DLL_SUFFIX)
            {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().is_none_or(|(seen, _)| modified > *seen) {
                newest = Some((modified, entry.path()));
            }
        }
    }
    newest.map(|(_, path)| path).expect("built cdylib")
}

#[test]
fn smoke_prints_exactly_three_labeled_lines() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");

    let output = cmd()
        .args(["--search-path", lib_dir.to_str().unwrap()])
        .env("HOME", &home)
        .output()
        .expect("probe");
    assert!(output.status.success());
    assert!(output.stderr.is_empty());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("homedir: {}", home.display()));
    assert_eq!(lines[1], format!("get_dir_localized: {}", home.display()));
    assert_eq!(lines[2], format!("version: {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn localized_variant_is_selected_for_the_active_locale() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");
    fs::create_dir(temp.path().join("home.de")).expect("localized dir");

    let output = cmd()
        .args(["--search-path", lib_dir.to_str().unwrap()])
        .env("HOME", &home)
        .env("LC_MESSAGES", "de")
        .output()
        .expect("probe");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], format!("get_dir_localized: {}.de", home.display()));
}

#[test]
fn missing_library_fails_before_any_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let empty = temp.path().join("empty");
    fs::create_dir(&empty).expect("empty dir");

    let output = cmd()
        .args(["--search-path", empty.to_str().unwrap()])
        .output()
        .expect("probe");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());

    let err = parse_json_line(&output.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    let hint = err["error"]["hint"].as_str().expect("hint");
    assert!(hint.contains("--search-path"));
}

#[test]
fn corrupt_library_reports_the_offending_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    let soname = Requirement::util().candidate_names().expect("registered")[0];
    fs::write(lib_dir.join(soname), b"not an object file").expect("junk");

    let output = cmd()
        .args(["--search-path", lib_dir.to_str().unwrap()])
        .output()
        .expect("probe");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());

    let err = parse_json_line(&output.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert_eq!(err["error"]["message"], "failed to load library");
    let path = err["error"]["path"].as_str().expect("path");
    assert!(path.ends_with(soname));
    assert!(err["error"]["causes"].as_array().is_some_and(|c| !c.is_empty()));
}

#[test]
fn env_override_locates_the_library() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");

    let output = cmd()
        .env(PATH_ENV, &lib_dir)
        .env("HOME", &home)
        .output()
        .expect("probe");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn flags_take_precedence_over_the_environment() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let decoy = temp.path().join("decoy");
    fs::create_dir(&decoy).expect("decoy dir");
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");

    let output = cmd()
        .args(["--search-path", lib_dir.to_str().unwrap()])
        .env(PATH_ENV, &decoy)
        .env("HOME", &home)
        .output()
        .expect("probe");
    assert!(output.status.success());
}

#[test]
fn json_mode_emits_a_single_report_object() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");

    let output = cmd()
        .args(["--search-path", lib_dir.to_str().unwrap(), "--json"])
        .env("HOME", &home)
        .output()
        .expect("probe");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.lines().count(), 1);
    let report = parse_json(stdout.trim());
    let map = report.as_object().expect("object");
    assert_eq!(map.len(), 3);
    assert_eq!(report["homedir"], home.to_str().unwrap());
    assert_eq!(report["dir_localized"], home.to_str().unwrap());
    assert_eq!(report["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn color_always_keeps_piped_json_colored() {
    let temp = tempfile::tempdir().expect("tempdir");
    let lib_dir = temp.path().join("libdir");
    fs::create_dir(&lib_dir).expect("lib dir");
    stage_fixture(&lib_dir);
    let home = temp.path().join("home");
    fs::create_dir(&home).expect("home dir");

    let output = cmd()
        .args([
            "--search-path",
            lib_dir.to_str().unwrap(),
            "--json",
            "--color",
            "always",
        ])
        .env("HOME", &home)
        .output()
        .expect("probe");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.lines().count() > 1);
    assert!(stdout.contains("\u{1b}[32m"));
    let plain = stdout.replace("\u{1b}[32m", "").replace("\u{1b}[0m", "");
    let report = parse_json(plain.trim());
    assert_eq!(report["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = cmd().arg("--nope").output().expect("probe");
    assert_eq!(output.status.code().unwrap(), 2);
    let err = parse_json_line(&output.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
}
