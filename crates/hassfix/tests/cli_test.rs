//! Integration tests for the `hassfix` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling — all without requiring a live Home Assistant
//! instance.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hassfix` binary with env isolation.
///
/// Clears all `HASSFIX_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn hassfix_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hassfix");
    cmd.env("HOME", "/tmp/hassfix-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hassfix-cli-test-nonexistent")
        .env_remove("HASSFIX_PROFILE")
        .env_remove("HASSFIX_HOST")
        .env_remove("HASSFIX_TOKEN")
        .env_remove("HASSFIX_OUTPUT")
        .env_remove("HASSFIX_INSECURE")
        .env_remove("HASSFIX_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hassfix_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hassfix_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Home Assistant")
            .and(predicate::str::contains("audit"))
            .and(predicate::str::contains("rename"))
            .and(predicate::str::contains("platforms")),
    );
}

#[test]
fn test_version_flag() {
    hassfix_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hassfix"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hassfix_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hassfix_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hassfix_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_audit_without_config_fails_with_usage_code() {
    let output = hassfix_cmd()
        .args(["audit", "automations"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("config") || text.contains("host"),
        "Expected a hint about missing configuration:\n{text}"
    );
}

#[test]
fn test_host_without_token_fails_with_auth_code() {
    let output = hassfix_cmd()
        .args(["--host", "hass.invalid:8123", "entities", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected exit code 3");
    let text = combined_output(&output);
    assert!(
        text.contains("token"),
        "Expected a hint about the missing token:\n{text}"
    );
}

#[test]
fn test_config_show_no_config() {
    // `config show` uses the default config when no file exists.
    hassfix_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = hassfix_cmd()
        .args(["--output", "invalid", "platforms"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly — the failure should be about
    // missing configuration, not about argument parsing.
    hassfix_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "audit",
            "automations",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config").or(predicate::str::contains("host")));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_audit_subcommands_exist() {
    hassfix_cmd()
        .args(["audit", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("automations")
                .and(predicate::str::contains("scripts"))
                .and(predicate::str::contains("groups"))
                .and(predicate::str::contains("dashboards"))
                .and(predicate::str::contains("all")),
        );
}

#[test]
fn test_names_subcommands_exist() {
    hassfix_cmd()
        .args(["names", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_rename_requires_search() {
    let output = hassfix_cmd().arg("rename").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("--search"),
        "Expected a hint about the required --search flag:\n{text}"
    );
}

#[test]
fn test_config_subcommands_exist() {
    hassfix_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles")),
        );
}
