//! Integration tests for the `cleep` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a device; the end-to-end cases talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `cleep` binary with env isolation.
///
/// Clears all `CLEEP_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn cleep_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cleep");
    cmd.env("HOME", "/tmp/cleep-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/cleep-cli-test-nonexistent")
        .env_remove("CLEEP_PROFILE")
        .env_remove("CLEEP_URL")
        .env_remove("CLEEP_USERNAME")
        .env_remove("CLEEP_PASSWORD")
        .env_remove("CLEEP_MODULE")
        .env_remove("CLEEP_OUTPUT")
        .env_remove("CLEEP_INSECURE")
        .env_remove("CLEEP_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_cleep(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || cleep_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": false, "message": "", "data": data }))
}

fn module_config(hostname: &str) -> serde_json::Value {
    json!({
        "hostname": hostname,
        "position": { "latitude": 45.76, "longitude": 4.83 },
        "sun": { "sunrise": 1_700_000_000, "sunset": 1_700_040_000 },
        "country": { "country": "France", "alpha2": "FR" },
        "timezone": "Europe/Paris",
        "authenabled": false,
        "authaccounts": ["admin"],
    })
}

async fn mount_config(server: &MockServer, hostname: &str) {
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "to": "parameters", "command": "get_module_config" })))
        .respond_with(envelope(module_config(hostname)))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = cleep_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    cleep_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Cleep device")
            .and(predicate::str::contains("hostname"))
            .and(predicate::str::contains("position"))
            .and(predicate::str::contains("auth")),
    );
}

#[test]
fn test_version_flag() {
    cleep_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cleep"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    cleep_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    cleep_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error handling ──────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = cleep_cmd().arg("reboot").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("unrecognized subcommand"), "{text}");
}

#[test]
fn test_show_without_device_fails() {
    let output = cleep_cmd().arg("show").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("No device configured"), "{text}");
}

#[test]
fn test_invalid_hostname_rejected_before_connecting() {
    // Port 9 (discard) is never contacted: validation fails first.
    let output = cleep_cmd()
        .args(["--url", "http://127.0.0.1:9", "hostname", "ab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("hostname"), "{text}");
}

#[test]
fn test_invalid_url_is_a_usage_error() {
    let output = cleep_cmd()
        .args(["--url", "ftp://cleep.local", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_show_no_config() {
    cleep_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = cleep_cmd()
        .args(["--output", "xml", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_negative_coordinates_parse() {
    // Parsing succeeds; the command then fails for lack of a device.
    let output = cleep_cmd()
        .args(["position", "-33.86", "-151.2"])
        .output()
        .unwrap();
    let text = combined_output(&output);
    assert!(!text.contains("unexpected argument"), "{text}");
    assert!(text.contains("No device configured"), "{text}");
}

#[test]
fn test_auth_subcommands_exist() {
    cleep_cmd()
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("enable")
                .and(predicate::str::contains("disable"))
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("delete")),
        );
}

// ── Against a mock device ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_show_json_against_mock_device() {
    let server = MockServer::start().await;
    mount_config(&server, "kitchen").await;

    let output = run_cleep(vec![
        "--url".into(),
        server.uri(),
        "-o".into(),
        "json".into(),
        "show".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["hostname"], "kitchen");
    assert_eq!(view["country"]["alpha2"], "FR");
    assert_eq!(view["auth_accounts"][0]["identifier"], "admin");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hostname_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({
            "command": "set_hostname",
            "params": { "hostname": "kitchen" },
        })))
        .respond_with(envelope(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    mount_config(&server, "kitchen").await;

    let output = run_cleep(vec![
        "--url".into(),
        server.uri(),
        "-o".into(),
        "plain".into(),
        "hostname".into(),
        "kitchen".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "kitchen");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Device name saved"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unset_position_sends_no_command() {
    let server = MockServer::start().await;
    mount_config(&server, "cleep").await;

    let output = run_cleep(vec![
        "--url".into(),
        server.uri(),
        "position".into(),
        "0".into(),
        "5".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Please select position"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the initial config fetch");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_command_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(body_partial_json(json!({ "command": "enable_auth" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Please add account before enabling auth",
            "data": null,
        })))
        .mount(&server)
        .await;

    let output = run_cleep(vec![
        "--url".into(),
        server.uri(),
        "auth".into(),
        "enable".into(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("Please add account before enabling auth"));
}
