//! Shared E2E test helpers for `disuware` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for a single CLI invocation.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Build a Command for the `disuware` binary with a clean log environment.
pub fn disuware_cmd() -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("disuware");
    cmd.timeout(TIMEOUT_BASIC);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Path to a configuration under the workspace `fixtures/` directory.
pub fn fixture_config(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
        .join("config.toml")
}

/// Write a module directory with the given manifest under `root`.
pub fn write_module(root: &Path, name: &str, manifest: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("create module dir");
    std::fs::write(dir.join("disuwaremodule.json"), manifest).expect("write manifest");
}

/// Write a configuration scanning `root/modules` and return its path.
pub fn write_config(root: &Path) -> PathBuf {
    let path = root.join("config.toml");
    std::fs::write(&path, "module_dirs = [\"modules\"]\n").expect("write config");
    path
}
