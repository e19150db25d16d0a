//! Integration tests for the `vestgate` CLI binary.
//!
//! These run the CLI as a subprocess and check exit codes, stdout, and the
//! session file it leaves behind. Each test gets its own temp directory for
//! the session file so runs never share state.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS2025_DIGEST: &str = "6a0fb0537b1a1e736a4d5fa5045d272b8a5c4c045d243ba31f0a59cf76f12c0f";
const CUSTOM_DIGEST: &str = "7cd5885327fd60e825d67d32f9d22b018227a208aa3c4819da15b36b5d5869d3";

/// Helper: locate the `vestgate` binary built by `cargo test`.
fn vestgate_bin() -> String {
    let path = env!("CARGO_BIN_EXE_vestgate");
    assert!(
        Path::new(path).exists(),
        "vestgate binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: run vestgate with args and a private session file, returning
/// (`exit_code`, stdout, stderr).
fn run_in(dir: &TempDir, args: &[&str], env: &[(&str, &str)]) -> (i32, String, String) {
    let mut cmd = Command::new(vestgate_bin());
    cmd.args(args)
        .env("VESTGATE_SESSION_FILE", dir.path().join("session.json"))
        .env_remove("VESTGATE_PASSCODE_HASHES")
        .env_remove("RUST_LOG");
    for (k, v) in env {
        cmd.env(k, v);
    }
    let output = cmd.output().expect("failed to execute vestgate");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn run(args: &[&str]) -> (i32, String, String) {
    let dir = tempfile::tempdir().unwrap();
    run_in(&dir, args, &[])
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0, "vestgate --version should exit 0");
    assert!(stdout.contains("vestgate"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    for sub in ["hash", "verify", "access", "fetch"] {
        assert!(stdout.contains(sub), "help should list '{sub}': {stdout}");
    }
}

// ── hash ─────────────────────────────────────────────────────────────

#[test]
fn test_hash_normalizes_before_digest() {
    let (code, stdout, _) = run(&["hash", "  access2025 "]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), ACCESS2025_DIGEST);
}

// ── verify ───────────────────────────────────────────────────────────

#[test]
fn test_verify_builtin_code() {
    let (code, stdout, _) = run(&["verify", "access2025"]);
    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("access granted"));
}

#[test]
fn test_verify_wrong_code_denied() {
    let (code, stdout, _) = run(&["verify", "not-a-code"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("access denied"));
}

#[test]
fn test_verify_blank_denied() {
    let (code, stdout, _) = run(&["verify", "   "]);
    assert_eq!(code, 1);
    assert!(stdout.contains("access denied"));
}

#[test]
fn test_verify_uses_env_allow_list() {
    let dir = tempfile::tempdir().unwrap();
    let env = [("VESTGATE_PASSCODE_HASHES", CUSTOM_DIGEST)];

    let (code, _, _) = run_in(&dir, &["verify", "custom"], &env);
    assert_eq!(code, 0);

    // The built-in codes are replaced, not extended.
    let (code, _, _) = run_in(&dir, &["verify", "ACCESS2025"], &env);
    assert_eq!(code, 1);
}

#[test]
fn test_verify_uses_allow_list_file() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("allow.json");
    std::fs::write(&list, format!(r#"["{CUSTOM_DIGEST}", "UNSET_SLOT"]"#)).unwrap();
    let list = list.to_str().unwrap();

    let (code, _, _) = run_in(&dir, &["verify", "CUSTOM", "--allow-list", list], &[]);
    assert_eq!(code, 0);

    let (code, _, _) = run_in(&dir, &["verify", "UNSET_SLOT", "--allow-list", list], &[]);
    assert_eq!(code, 1);
}

#[test]
fn test_verify_bad_allow_list_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("allow.json");
    std::fs::write(&list, "not json").unwrap();

    let (code, _, stderr) = run_in(
        &dir,
        &["verify", "CUSTOM", "--allow-list", list.to_str().unwrap()],
        &[],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("failed to parse allow-list"), "stderr: {stderr}");
}

// ── access ───────────────────────────────────────────────────────────

#[test]
fn test_access_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_in(&dir, &["access", "status"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("unverified"));

    let (code, _, _) = run_in(&dir, &["access", "grant"], &[]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_in(&dir, &["access", "status"], &[]);
    assert!(stdout.contains("verified"));
    assert!(!stdout.contains("unverified"));

    let (code, _, _) = run_in(&dir, &["access", "revoke"], &[]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_in(&dir, &["access", "status"], &[]);
    assert!(stdout.contains("unverified"));
}

#[test]
fn test_verify_grant_writes_session_file() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, _) = run_in(&dir, &["verify", "ACCESS2025", "--grant"], &[]);
    assert_eq!(code, 0);

    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(raw.contains("document_access_verified"));
    assert!(raw.contains("document_access_time"));
}

#[test]
fn test_denied_verify_does_not_grant() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, _) = run_in(&dir, &["verify", "wrong", "--grant"], &[]);
    assert_eq!(code, 1);
    assert!(!dir.path().join("session.json").exists());
}

#[test]
fn test_expired_session_file_reads_unverified_and_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("session.json"),
        r#"{"document_access_verified": "true", "document_access_time": "1000"}"#,
    )
    .unwrap();

    let (_, stdout, _) = run_in(&dir, &["access", "status"], &[]);
    assert!(stdout.contains("unverified"));

    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(!raw.contains("document_access"));
}

#[test]
fn test_revoke_resets_corrupt_session_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("session.json"), "{truncated").unwrap();

    let (code, _, stderr) = run_in(&dir, &["access", "revoke"], &[]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let (code, stdout, _) = run_in(&dir, &["access", "status"], &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("unverified"));

    let (code, _, _) = run_in(&dir, &["access", "grant"], &[]);
    assert_eq!(code, 0);
}

// ── fetch ────────────────────────────────────────────────────────────

#[test]
fn test_fetch_unreachable_host_fails() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let url = format!("http://{addr}/");

    let (code, _, stderr) = run(&["fetch", url.as_str(), "--max-retries", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("request to"), "stderr: {stderr}");
}

#[test]
fn test_fetch_rejects_malformed_header() {
    let (code, _, stderr) = run(&["fetch", "http://127.0.0.1:1/", "-H", "nocolon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Name: value"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_prints_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/faq"))
        .and(header("cache-control", "no-store"))
        .and(header("x-locale", "en-GB"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello investors"))
        .mount(&server)
        .await;
    let url = format!("{}/faq", server.uri());

    let (code, stdout, _) = tokio::task::spawn_blocking(move || {
        run(&["fetch", url.as_str(), "--no-store", "-H", "x-locale: en-GB"])
    })
    .await
    .unwrap();

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("HTTP 200"));
    assert!(stdout.contains("hello investors"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_server_error_exits_nonzero_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let url = server.uri();

    let (code, stdout, _) = tokio::task::spawn_blocking(move || {
        run(&["fetch", url.as_str(), "--max-retries", "1"])
    })
    .await
    .unwrap();

    assert_eq!(code, 1);
    assert!(stdout.contains("HTTP 502"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
