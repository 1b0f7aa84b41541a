// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `portal --help`, per-command help and version output.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use yare::parameterized;

fn portal() -> Command {
    cargo_bin_cmd!("portal")
}

#[test]
fn help_lists_every_command() {
    portal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("listen"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn no_arguments_is_usage_error() {
    portal()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[parameterized(
    listen = { "listen" },
    upload = { "upload" },
    tree = { "tree" },
    watch = { "watch" },
    fetch = { "fetch" },
)]
fn command_supports_help_flag(cmd: &str) {
    portal()
        .args([cmd, "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn listen_help_shows_options() {
    portal()
        .args(["listen", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--materialize"));
}

#[test]
fn global_flags_are_documented() {
    portal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn version_flag_prints_version() {
    portal()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_fails() {
    portal()
        .arg("explode")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
