// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `portal upload` preconditions. None of these reach the network.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LIMIT: u64 = 100 * 1024 * 1024;

/// `portal` pointed at a relay address where nothing listens.
fn portal(temp: &TempDir) -> Command {
    let config = temp.path().join("portal.toml");
    std::fs::write(
        &config,
        "[relay]\napi_url = \"http://127.0.0.1:9\"\nws_url = \"ws://127.0.0.1:9\"\n",
    )
    .unwrap();
    let mut cmd = cargo_bin_cmd!("portal");
    cmd.env("XDG_CONFIG_HOME", temp.path()).arg("--config").arg(config);
    cmd
}

#[test]
fn upload_requires_a_path() {
    let temp = TempDir::new().unwrap();
    portal(&temp)
        .arg("upload")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn oversized_file_is_rejected_before_connecting() {
    let temp = TempDir::new().unwrap();
    let big = temp.path().join("big.bin");
    std::fs::File::create(&big)
        .unwrap()
        .set_len(LIMIT + 1)
        .unwrap();

    portal(&temp)
        .arg("upload")
        .arg(&big)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "upload: payload of {} bytes exceeds the {} byte limit",
            LIMIT + 1,
            LIMIT
        )));
}

#[test]
fn missing_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.txt");

    portal(&temp)
        .arg("upload")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn unreachable_relay_is_a_session_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("a.txt");
    std::fs::write(&file, b"hello").unwrap();

    portal(&temp)
        .arg("upload")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: session: connect failed"));
}
