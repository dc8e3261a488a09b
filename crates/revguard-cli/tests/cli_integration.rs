//! CLI integration tests for the `revguard` binary.
//!
//! Each test spawns the compiled binary with `REVGUARD_CONFIG` pointing at
//! a nonexistent path so the config loader falls back to defaults.

use std::io::Write;
use std::process::Command;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a `Command` pointing at the compiled `revguard` binary.
fn revguard_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_revguard"));
    cmd.env("REVGUARD_CONFIG", "/tmp/.revguard-test-nonexistent-config.json");
    // Suppress tracing output so test assertions only match program output.
    cmd.env("RUST_LOG", "off");
    cmd
}

// ── Version and help ────────────────────────────────────────────────────

#[test]
fn version_output() {
    let output = revguard_bin()
        .arg("--version")
        .output()
        .expect("failed to run revguard");

    assert!(output.status.success(), "exit code should be 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("revguard") && stdout.contains("0.1.0"),
        "version output should contain 'revguard' and '0.1.0', got: {stdout}"
    );
}

#[test]
fn help_lists_subcommands() {
    let output = revguard_bin()
        .arg("--help")
        .output()
        .expect("failed to run revguard");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["serve", "check", "config"] {
        assert!(stdout.contains(sub), "help should list '{sub}', got: {stdout}");
    }
}

#[test]
fn unknown_subcommand_fails() {
    let output = revguard_bin()
        .arg("frobnicate")
        .output()
        .expect("failed to run revguard");
    assert!(!output.status.success());
}

// ── Config ──────────────────────────────────────────────────────────────

#[test]
fn config_prints_defaults() {
    let output = revguard_bin()
        .arg("config")
        .output()
        .expect("failed to run revguard");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value =
        serde_json::from_str(&stdout).expect("config output should be JSON");
    assert_eq!(value["site"]["host"], "en.wikipedia.org");
    assert_eq!(value["fetch"]["history_limit"], 5);
    assert_eq!(value["proxy"]["listen"], "127.0.0.1:8080");
}

#[test]
fn config_reads_camel_case_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"site": {{"host": "de.wikipedia.org"}}, "fetch": {{"historyLimit": 8}}}}"#
    )
    .unwrap();

    let output = revguard_bin()
        .args(["config", "--section", "fetch", "--config"])
        .arg(file.path())
        .output()
        .expect("failed to run revguard");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"history_limit\": 8"), "got: {stdout}");
}

#[test]
fn config_rejects_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"fetch": {{"history_limit": 0}}}}"#).unwrap();

    let output = revguard_bin()
        .args(["config", "--config"])
        .arg(file.path())
        .output()
        .expect("failed to run revguard");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"), "got: {stderr}");
}

#[test]
fn config_missing_explicit_file_fails() {
    let output = revguard_bin()
        .args(["config", "--config", "/tmp/.revguard-definitely-missing.json"])
        .output()
        .expect("failed to run revguard");
    assert!(!output.status.success());
}

// ── Check ───────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn check_reports_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/w/index.php"))
        .and(query_param("pages", "Cat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<mediawiki><page>\
             <revision><id>103</id><timestamp>2011-03-01T10:00:00Z</timestamp>\
             <contributor><ip>198.51.100.7</ip></contributor></revision>\
             <revision><id>102</id><contributor><username>Alice</username></contributor></revision>\
             </page></mediawiki>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let output = revguard_bin()
        .args(["check", "Cat", "--origin"])
        .arg(server.address().to_string())
        .output()
        .expect("failed to run revguard");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ip 198.51.100.7"), "got: {stdout}");
    assert!(stdout.contains("user Alice"), "got: {stdout}");
    assert!(
        stdout.contains("would redirect to http://en.wikipedia.org/wiki/Cat?oldid=102"),
        "got: {stdout}"
    );
}

#[test]
fn check_unreachable_origin_fails() {
    let output = revguard_bin()
        .args(["check", "Cat", "--origin", "127.0.0.1:1"])
        .output()
        .expect("failed to run revguard");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fetching failed"), "got: {stderr}");
}
