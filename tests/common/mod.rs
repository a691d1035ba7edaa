//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::CommandCargoExt;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// Copy the sample feed into `root` and point an offline config at it.
pub fn offline_root(root: &Path) -> PathBuf {
    let feed = root.join("skills.csv");
    std::fs::copy(fixture_path("tests/fixtures/feeds/skills.csv"), &feed).unwrap();
    std::fs::write(
        root.join("config.toml"),
        "[source]\nmode = \"offline\"\nfeed_path = \"skills.csv\"\npoll_interval_ms = 20\n",
    )
    .unwrap();
    feed
}

/// `sb` isolated under `root`: no global config, no inherited overrides.
pub fn sb(root: &Path) -> Command {
    Command::from_std(sb_process(root))
}

/// Same as [`sb`] as a plain process, for tests that stream its output.
pub fn sb_process(root: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::cargo_bin("sb").unwrap();
    cmd.env("SB_ROOT", root)
        .env("XDG_CONFIG_HOME", root.join("xdg"))
        .env_remove("SB_CONFIG")
        .env_remove("SB_ROBOT")
        .env_remove("SB_SOURCE_MODE")
        .env_remove("SB_DATABASE_PATH")
        .env_remove("SB_FEED_PATH")
        .env_remove("SB_POLL_INTERVAL_MS")
        .env_remove("SB_GRAPH_SENTINEL")
        .env_remove("SB_GRAPH_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `sb --robot <args>` and parse stdout.
pub fn robot_json(root: &Path, args: &[&str]) -> serde_json::Value {
    let output = sb(root).arg("--robot").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "sb {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
