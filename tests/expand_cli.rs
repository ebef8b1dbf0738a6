// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

/// Stub search backend: ignores its arguments, prints the canned JSONL
/// payload and exits with the given status.
fn stub_rg(dir: &Path, payload: &str, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let data = dir.join("rg-output.jsonl");
    fs::write(&data, payload).expect("write payload");

    let script = dir.join("stub-rg");
    fs::write(
        &script,
        format!("#!/bin/sh\ncat \"{}\"\nexit {}\n", data.display(), exit_code),
    )
    .expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    script
}

fn match_event(path: &str, line_number: u64, text: &str) -> Value {
    json!({
        "type": "match",
        "data": {
            "path": {"text": path},
            "lines": {"text": format!("{text}\n")},
            "line_number": line_number,
            "submatches": []
        }
    })
}

fn jsonl(events: &[Value]) -> String {
    let mut out = events
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

fn linefill() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("linefill"))
}

#[test]
fn line_mode_dedupes_and_preserves_first_seen_order() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");

    let payload = jsonl(&[
        match_event("a.rs", 3, "let total = compute();"),
        match_event("b.rs", 8, "let total = compute();"),
        match_event("c.rs", 1, "let total_count = 0;"),
    ]);
    let rg = stub_rg(dir.path(), &payload, 0);

    let assert = linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1"])
        .args(["--root", dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let items: Value = serde_json::from_str(&stdout).expect("json");
    let items = items.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["label"], "let total = compute();");
    assert_eq!(items[0]["value"], "let total = compute();");
    assert_eq!(items[0]["detail"], "a.rs:3");
    assert_eq!(items[1]["label"], "let total_count = 0;");
}

#[test]
fn invocation_site_is_excluded_from_results() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");

    let payload = jsonl(&[
        match_event(target.to_str().unwrap(), 1, "let total = self;"),
        match_event("other.rs", 4, "let total = other;"),
    ]);
    let rg = stub_rg(dir.path(), &payload, 0);

    let assert = linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1"])
        .args(["--root", dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let items: Value = serde_json::from_str(&stdout).expect("json");
    let items = items.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["detail"], "other.rs:4");
}

#[test]
fn no_match_exit_is_a_no_results_state_not_an_error() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");
    let rg = stub_rg(dir.path(), "", 1);

    linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found"));
}

#[test]
fn no_results_json_is_an_unselectable_status_entry() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");
    let rg = stub_rg(dir.path(), "", 1);

    let assert = linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let items: Value = serde_json::from_str(&stdout).expect("json");
    let items = items.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert!(items[0]["value"].is_null());
}

#[test]
fn backend_failure_surfaces_stderr() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");

    let script = dir.path().join("broken-rg");
    write_file(&script, "#!/bin/sh\necho 'regex parse error' >&2\nexit 2\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

    linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &script)
        .args(["line", target.to_str().unwrap(), "--line", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search backend failed"))
        .stderr(predicate::str::contains("regex parse error"));
}

#[test]
fn malformed_backend_output_fails_the_operation() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");
    let rg = stub_rg(dir.path(), "this is not json\n", 0);

    linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed search backend output"));
}

#[test]
fn out_of_range_line_aborts_silently() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total\n");
    let rg = stub_rg(dir.path(), "", 0);

    linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "99"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn blank_line_aborts_silently() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "first\n   \nlast\n");
    let rg = stub_rg(dir.path(), "", 0);

    linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "2"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn column_bounds_the_search_prefix() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let target = dir.path().join("app.rs");
    write_file(&target, "let total = 0;\n");

    // The stub echoes one candidate regardless; the point is that the
    // query the dedup seed uses is the prefix, not the full line, so the
    // full-line text is offered back as a candidate.
    let payload = jsonl(&[match_event("a.rs", 2, "let total = 0;")]);
    let rg = stub_rg(dir.path(), &payload, 0);

    let assert = linefill()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LINEFILL_RG", &rg)
        .args(["line", target.to_str().unwrap(), "--line", "1", "--col", "9"])
        .args(["--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let items: Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(items.as_array().expect("array").len(), 1);
}
