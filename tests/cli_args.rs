//! Integration tests for CLI argument handling

mod common;

use std::process::Command;

use common::spawn_backend;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_expiring_cache"))
        .args(args)
        .env_remove("BASE_URL")
        .output()
        .expect("Failed to execute expiring_cache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("expiring_cache"));
    assert!(stdout.contains("--ttl-ms"));
    assert!(stdout.contains("--repeat"));
}

#[test]
fn test_missing_paths_is_an_error() {
    let output = run_cli(&[]);
    assert!(!output.status.success(), "Expected missing PATH to fail");
}

#[test]
fn test_malformed_query_is_rejected() {
    let output = run_cli(&["--query", "no-equals-sign", "/posts"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("NAME=VALUE"),
        "Should explain the expected format: {}",
        stderr
    );
}

#[test]
fn test_invalid_base_url_fails_cleanly() {
    let output = run_cli(&["--base-url", "not a url", "/posts"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to create HTTP client"), "{}", stderr);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repeat_fetch_served_from_cache() {
    let (base_url, backend) = spawn_backend().await;

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_expiring_cache"))
        .args(["--base-url", base_url.as_str(), "--repeat", "2", "/posts/1"])
        .env_remove("BASE_URL")
        .output()
        .await
        .expect("Failed to execute expiring_cache");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{}", stderr);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{}", stdout);
    assert!(lines[0].starts_with("[network] /posts/1"), "{}", lines[0]);
    assert!(lines[1].starts_with("[cache] /posts/1"), "{}", lines[1]);
    assert!(lines[1].contains("\"id\":1"), "{}", lines[1]);

    // Second fetch never reached the backend
    assert_eq!(backend.hits(), 1);
}
