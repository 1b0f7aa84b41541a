// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for configuration loading and validation.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

/// `portal` with an isolated config directory.
fn portal(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("portal");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &TempDir, content: &str) -> std::path::PathBuf {
    let path = home.path().join("portal.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    portal(&home)
        .args(["--config", "/nonexistent/portal.toml", "tree"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: config error: failed to read"));
}

#[test]
fn unparseable_config_fails() {
    let home = TempDir::new().unwrap();
    let path = write_config(&home, "[relay\napi_url = ");
    portal(&home)
        .arg("--config")
        .arg(&path)
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[parameterized(
    relay_api = { "[relay]\napi_url = \"ftp://relay\"", "relay.api_url" },
    relay_ws = { "[relay]\nws_url = \"http://relay\"", "relay.ws_url" },
    inventory_api = { "[inventory]\napi_url = \"relay:8080\"", "inventory.api_url" },
    multiplier = { "[reconnect]\nbackoff_multiplier = 0.5", "backoff_multiplier" },
    initial_delay = { "[reconnect]\ninitial_delay_ms = 0", "initial_delay_ms" },
)]
fn invalid_values_are_rejected(content: &str, field: &str) {
    let home = TempDir::new().unwrap();
    let path = write_config(&home, content);
    portal(&home)
        .arg("--config")
        .arg(&path)
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains(field));
}

#[test]
fn partial_config_reaches_configured_backend() {
    let home = TempDir::new().unwrap();
    let path = write_config(
        &home,
        "[inventory]\napi_url = \"http://127.0.0.1:9\"\n\n[http]\nrequest_timeout_secs = 2\n",
    );
    portal(&home)
        .arg("--config")
        .arg(&path)
        .arg("tree")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: inventory: fetch tree failed"));
}

#[test]
fn user_config_file_is_picked_up() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config").join("portal");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[relay]\nws_url = \"bogus\"\n").unwrap();

    portal(&home)
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid relay.ws_url 'bogus'"));
}

#[test]
fn log_file_receives_logs() {
    let home = TempDir::new().unwrap();
    let path = write_config(&home, "[inventory]\napi_url = \"http://127.0.0.1:9\"\n");
    let log = home.path().join("logs").join("portal.log");

    portal(&home)
        .arg("--config")
        .arg(&path)
        .arg("--log-file")
        .arg(&log)
        .arg("tree")
        .assert()
        .failure();

    assert!(log.is_file());
}
