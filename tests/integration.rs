use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn subref_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_subref"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

const BASIC_PINS: [&str; 10] = [
    "--pin",
    "vendor/rails=deadbeef",
    "--pin",
    "lib/gadgets=abc123",
    "--pin",
    "lib/tools=0f0f0f",
    "--pin",
    "third_party/bits=1234",
    "--pin",
    "third_party/legacy=5678",
];

#[test]
fn links_resolves_every_submodule() {
    let output = subref_cmd("basic")
        .arg("links")
        .args(BASIC_PINS)
        .arg("--json")
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let rows = json["submodules"].as_array().unwrap();
    assert_eq!(rows.len(), 5);

    assert_eq!(rows[0]["path"], "vendor/rails");
    assert_eq!(rows[0]["root_link"], "https://github.com/rails/rails");
    assert_eq!(rows[0]["commit_link"], "https://github.com/rails/rails/tree/deadbeef");

    assert_eq!(rows[1]["root_link"], "/acme/gadgets");
    assert_eq!(rows[1]["commit_link"], "/acme/gadgets/tree/abc123");

    assert_eq!(rows[2]["root_link"], "/tools/lint");
    assert_eq!(rows[2]["commit_link"], "/tools/lint/tree/0f0f0f");

    assert_eq!(rows[3]["root_link"], "https://bitbucket.org/acme/bits");
    assert!(rows[3]["commit_link"].is_null(), "external link has no commit link");

    assert!(rows[4]["root_link"].is_null(), "ftp is not browsable");
    assert!(rows[4]["commit_link"].is_null(), "ftp is not browsable");
}

#[test]
fn links_text_output_marks_unbrowsable() {
    let output = subref_cmd("basic").arg("links").args(BASIC_PINS).output().unwrap();
    assert!(output.status.success(), "links failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("vendor/rails @ deadbeef"), "missing header: {stdout}");
    assert!(
        stdout.contains("ftp://example.org/some/thing (not browsable)"),
        "missing unbrowsable marker: {stdout}"
    );
}

#[test]
fn links_without_pin_fails() {
    let output = subref_cmd("basic")
        .args(["links", "--pin", "vendor/rails=deadbeef"])
        .output()
        .unwrap();
    assert!(!output.status.success(), "missing pins must fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing Pin"), "unexpected stderr: {stderr}");
}

#[test]
fn resolve_single_url() {
    let output = subref_cmd("basic")
        .args(["resolve", "../../foo/bar.git", "abc123", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["root_link"], "/foo/bar");
    assert_eq!(json["commit_link"], "/foo/bar/tree/abc123");
}

#[test]
fn resolve_current_directory_marker() {
    let output = subref_cmd("basic")
        .args(["resolve", "./", "abc123", "--json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["root_link"], "/acme/widgets");
}

#[test]
fn overrides_fill_missing_config() {
    let output = subref_cmd("unconfigured")
        .args([
            "links",
            "--pin",
            "self=abc123",
            "--json",
            "--base-url",
            "https://code.example.org",
            "--namespace",
            "team",
            "--project",
            "app",
        ])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["submodules"][0]["root_link"], "/team/app");
    assert_eq!(json["submodules"][0]["commit_link"], "/team/app/tree/abc123");
}

#[test]
fn missing_config_reports_setting() {
    let output = subref_cmd("unconfigured")
        .args(["resolve", "../x.git", "abc123"])
        .output()
        .unwrap();
    assert!(!output.status.success(), "resolve without config must fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("instance.base_url"), "unexpected stderr: {stderr}");
}

#[test]
fn info_json_reports_state() {
    let output = subref_cmd("basic").args(["info", "--json"]).output().unwrap();
    let json = stdout_json(&output);
    let state = &json["current_state"];
    assert_eq!(state["config_found"], true);
    assert_eq!(state["instance"], "https://git.example.com");
    assert_eq!(state["viewer"], "acme/widgets");
    assert_eq!(state["submodules"], 5);
}
