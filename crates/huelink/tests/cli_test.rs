//! Integration tests for the `huelink` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions and
//! configuration errors, all without a Hue bridge or relay.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `huelink` binary with env isolation.
///
/// Clears the `HUELINK_*` variables the CLI reads and points config
/// directories at a nonexistent path so tests never touch real settings.
fn huelink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("huelink");
    cmd.env("HOME", "/tmp/huelink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/huelink-cli-test-nonexistent")
        .env_remove("HUELINK_CONFIG")
        .env_remove("HUELINK_HUE_IP")
        .env_remove("HUELINK_HUE_USERNAME")
        .env_remove("HUELINK_TIMEOUT")
        .env_remove("HUELINK_OUTPUT")
        .env_remove("HUELINK_PORT")
        .env_remove("HUELINK_ENV")
        .env_remove("HUELINK_REMOTE")
        .env_remove("HUELINK_REMOTE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = huelink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_commands() {
    huelink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Hue")
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("pair"))
            .and(predicate::str::contains("groups")),
    );
}

#[test]
fn version_flag() {
    huelink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("huelink"));
}

#[test]
fn serve_help_shows_relay_flags() {
    huelink_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--port")
                .and(predicate::str::contains("--env"))
                .and(predicate::str::contains("--discover-hue"))
                .and(predicate::str::contains("--remote"))
                .and(predicate::str::contains("--remote-url")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn completions_bash() {
    huelink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn completions_zsh() {
    huelink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn invalid_subcommand() {
    let output = huelink_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn unknown_environment_is_rejected() {
    let output = huelink_cmd().args(["serve", "--env", "qa"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("possible values") || text.contains("invalid value"),
        "Expected error about allowed environments:\n{text}"
    );
}

#[test]
fn zero_retry_delay_is_a_usage_error() {
    let output = huelink_cmd()
        .args(["serve", "--retry-delay", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("retry_delay_secs"));
}

#[test]
fn groups_list_without_bridge_is_an_auth_error() {
    let output = huelink_cmd().args(["groups", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(
        text.contains("bridge address") && text.contains("huelink pair"),
        "Expected a pairing hint:\n{text}"
    );
}

#[test]
fn groups_set_requires_on_or_off() {
    let output = huelink_cmd()
        .args(["groups", "set", "Office"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn brightness_out_of_range_is_rejected() {
    let output = huelink_cmd()
        .args(["groups", "set", "Office", "--on", "--brightness", "256"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_output_format() {
    let output = huelink_cmd()
        .args(["--output", "invalid", "groups", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn pair_without_terminal_requires_yes() {
    let output = huelink_cmd()
        .args(["pair", "--hue-ip", "127.0.0.1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[relay]\nbroadcast_interval_secs = 0\n").unwrap();

    let output = huelink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["groups", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("broadcast_interval_secs"));
}
