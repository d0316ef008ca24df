//! Shared E2E test helpers for `mousetrap` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for basic CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Environment variables that would leak the developer's setup into a test.
const CONFIG_ENV_VARS: &[&str] = &[
    "MOUSETRAP_DEBUG",
    "MOUSETRAP_LOG_LEVEL",
    "MOUSETRAP_COMPONENTS",
    "MOUSETRAP_TICK_INTERVAL_MS",
    "RUST_LOG",
];

/// Build a Command for the `mousetrap` binary with an isolated home.
///
/// `HOME` points at a fresh temp dir so `~/.mousetrap/config.toml` never
/// comes from the real user. Ticks run every millisecond.
/// Returns (command, _guard); keep the guard alive for the test's duration.
pub fn mousetrap_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let home = tempfile::tempdir().expect("create temp home");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("mousetrap");
    cmd.timeout(TIMEOUT_BASIC);
    for var in CONFIG_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path());
    cmd.env("MOUSETRAP_TICK_INTERVAL_MS", "1");
    (cmd, home)
}

/// Write `content` as `name` inside `dir`.
pub fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write config file");
    path
}
