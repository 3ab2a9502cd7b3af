//! Integration tests for the `parkly` CLI binary.
//!
//! Argument parsing, help output, completions, and local config handling
//! run without a backend; the session tests drive the binary against a
//! wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `parkly` binary with env isolation.
///
/// Clears all `PARKLY_*` env vars and points home, config, and data
/// directories at `home` so tests never touch the user's real files.
fn parkly_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("parkly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("PARKLY_CONFIG", home.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("PARKLY_PROFILE")
        .env_remove("PARKLY_API_URL")
        .env_remove("PARKLY_LOCALE")
        .env_remove("PARKLY_OUTPUT")
        .env_remove("PARKLY_INSECURE")
        .env_remove("PARKLY_TIMEOUT")
        .env_remove("PARKLY_USERNAME")
        .env_remove("PARKLY_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-123",
            "first_name": "Ada",
            "last_name": "Admin",
            "email": "ada@example.com",
            "role": "admin"
        })))
        .mount(server)
        .await;
}

async fn login(home: &Path, server: &MockServer) -> std::process::Output {
    let mut cmd = parkly_cmd(home);
    cmd.env("PARKLY_API_URL", server.uri())
        .args(["login", "-u", "ada", "--password", "secret"]);
    run(cmd).await
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = parkly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("parking")
            .and(predicate::str::contains("users"))
            .and(predicate::str::contains("spots"))
            .and(predicate::str::contains("reservations")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parkly"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parkly"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["-o", "xml", "users", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_nearby_needs_both_coordinates() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["spots", "nearby", "--longitude", "69.2"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_env() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_then_show() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["config", "set", "api_url", "http://localhost:8080/api/v1/"])
        .assert()
        .success();
    parkly_cmd(home.path())
        .args(["config", "set", "locale", "ru"])
        .assert()
        .success();

    parkly_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("http://localhost:8080/api/v1/"))
                .and(predicate::str::contains("locale = \"ru\"")),
        );
}

#[test]
fn test_config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_set_default_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["config", "use", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ── Columns ─────────────────────────────────────────────────────────

#[test]
fn test_column_toggles_persist() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["-o", "plain", "columns", "spots", "-t", "latitude", "-t", "address"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("latitude").and(predicate::str::contains("address").not()),
        );

    let saved = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(saved.contains("[columns.parking-spots]"), "{saved}");

    parkly_cmd(home.path())
        .args(["-o", "plain", "columns", "spots", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("address"));

    let saved = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(!saved.contains("[columns"), "{saved}");
}

#[test]
fn test_unknown_column() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .args(["columns", "users", "-t", "colour"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("full_name"));
}

// ── Auth errors without a backend ───────────────────────────────────

#[test]
fn test_no_config_error() {
    let home = tempfile::tempdir().unwrap();
    let output = parkly_cmd(home.path()).args(["users", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("parkly config init"));
}

#[test]
fn test_not_logged_in_exit_code() {
    let home = tempfile::tempdir().unwrap();
    parkly_cmd(home.path())
        .env("PARKLY_API_URL", "http://127.0.0.1:9/")
        .args(["payments", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("parkly login"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list_users() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 2, "full_name": "Zafar", "email": "z@example.com", "role": "USER"},
                {"id": 1, "full_name": "Aziza", "email": "a@example.com", "role": "ADMIN"}
            ]
        })))
        .mount(&server)
        .await;

    let output = login(home.path(), &server).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Ada Admin"));

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri()).args(["users", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 2"), "{stdout}");
    assert!(stdout.contains("ADMIN: 1"), "{stdout}");
    assert!(stdout.contains("Page 1/1"), "{stdout}");
    let aziza = stdout.find("Aziza").unwrap();
    let zafar = stdout.find("Zafar").unwrap();
    assert!(aziza < zafar, "rows should be sorted by name:\n{stdout}");

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri())
        .args(["-o", "json", "whoami"]);
    let output = run(cmd).await;
    assert!(output.status.success());
    let who: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(who["name"], "Ada Admin");
    assert_eq!(who["role"], "admin");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = login(home.path(), &server).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Login failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_logs_out() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(login(home.path(), &server).await.status.success());

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri())
        .args(["reservations", "list"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Session expired"));

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri()).arg("whoami");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_requires_yes_without_terminal() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    assert!(login(home.path(), &server).await.status.success());

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri())
        .args(["payments", "delete", "7"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_payment_from_set_fields() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(wiremock::matchers::body_partial_json(json!({
            "amount": 15000.0,
            "payment_method": "card",
            "reservation_id": "12"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(login(home.path(), &server).await.status.success());

    let mut cmd = parkly_cmd(home.path());
    cmd.env("PARKLY_API_URL", server.uri()).args([
        "payments",
        "create",
        "--set",
        "amount:=15000",
        "--set",
        "payment_method=card",
        "--set",
        "payment_status=pending",
        "--set",
        "transaction_id=tx-9",
        "--set",
        "reservation_id=12",
    ]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Payment created"));
}
