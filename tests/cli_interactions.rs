//! CLI options interaction tests
//!
//! These tests run the `nst` binary and check option validation, the example
//! configuration writer and a full JSON run against a local mock server.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Variables that would otherwise leak host configuration into a run
const CONFIG_VARS: &[&str] = &[
    "DOWNLOAD_TARGETS",
    "PING_TARGET",
    "DOWNLOAD_WINDOW_MS",
    "CONCURRENCY",
    "UPLOAD_DURATION_MS",
    "PING_TIMEOUT_MS",
    "REQUEST_TIMEOUT_SECONDS",
    "ENABLE_COLOR",
    "ENABLE_ANALYSIS",
    "GEMINI_API_KEY",
    "API_KEY",
    "GEMINI_MODEL",
];

/// Helper function to create a test command
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("nst").unwrap();
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_options() {
    create_test_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target"))
        .stdout(predicate::str::contains("--window"))
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_version_flag() {
    create_test_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_out_of_range_values_are_rejected() {
    for (flag, value) in [
        ("--concurrency", "0"),
        ("--concurrency", "17"),
        ("--window", "500"),
        ("--upload-duration", "100"),
        ("--ping-timeout", "50"),
        ("--request-timeout", "0"),
    ] {
        create_test_cmd()
            .arg(flag)
            .arg(value)
            .assert()
            .failure()
            .stderr(predicate::str::contains("must be between"));
    }
}

#[test]
fn test_conflicting_color_flags() {
    create_test_cmd()
        .args(["--color", "--no-color"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot specify both --color and --no-color"));
}

#[test]
fn test_non_http_target_is_rejected() {
    create_test_cmd()
        .args(["--target", "ftp://files.test/big.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target must be an http(s) URL"));
}

#[test]
fn test_write_env_example() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join("example.env");

    create_test_cmd()
        .arg("--write-env-example")
        .arg(&env_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote example configuration"));

    let content = std::fs::read_to_string(&env_path).unwrap();
    assert!(content.contains("DOWNLOAD_TARGETS="));
    assert!(content.contains("GEMINI_API_KEY="));
}

#[test]
fn test_invalid_env_value_reports_config_error() {
    create_test_cmd()
        .env("CONCURRENCY", "lots")
        .args(["--no-network-info", "--no-analysis"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("CONCURRENCY"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_run_against_local_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 256 * 1024]))
        .mount(&server)
        .await;

    let target = format!("{}/file.bin", server.uri());
    let ping_target = format!("{}/ping", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        create_test_cmd()
            .args([
                "--target", target.as_str(),
                "--ping-target", ping_target.as_str(),
                "--window", "1000",
                "--upload-duration", "500",
                "--no-analysis",
                "--no-network-info",
                "--json",
            ])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let result = &report["result"];
    assert!(result["ping_ms"].as_u64().is_some());

    let download = result["download_mbps"].as_f64().unwrap();
    let upload = result["upload_mbps"].as_f64().unwrap();
    assert!(download > 0.0);
    assert!(upload > 0.0 && upload <= download);

    assert_eq!(report["analysis"]["status"], "skipped");
    assert!(report.get("network").is_none());
    assert!(report["download_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_ping_target_fails_with_exit_code() {
    let output = tokio::task::spawn_blocking(|| {
        create_test_cmd()
            .args([
                "--target", "http://127.0.0.1:9/file.bin",
                "--ping-target", "http://127.0.0.1:9/ping",
                "--ping-timeout", "500",
                "--no-analysis",
                "--no-network-info",
            ])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Latency probe target unreachable"), "stderr: {}", stderr);
}
