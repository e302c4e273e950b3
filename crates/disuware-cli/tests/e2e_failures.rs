//! E2E tests for the failure paths of the `disuware` binary.

mod common;

use common::{disuware_cmd, write_config, write_module};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn missing_config_file_fails() {
    disuware_cmd()
        .args(["run", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(contains("does-not-exist.toml"));
}

#[test]
fn config_without_module_dirs_fails() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "keep_alive = false\n").unwrap();

    disuware_cmd()
        .arg("list")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("configuration is invalid"));
}

#[test]
fn missing_subcommand_fails() {
    disuware_cmd().assert().failure();
}

#[test]
fn invalid_manifest_fails_discovery() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    write_module(
        &tmp.path().join("modules"),
        "broken",
        r#"{"interface": "broken", "version": "1.0.0", "requires": {"dict": "not a range"}}"#,
    );

    disuware_cmd()
        .arg("list")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("broken"))
        .stderr(contains("is invalid"));
}

#[test]
fn unlinkable_modules_fail_list_linked_only() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    write_module(
        &tmp.path().join("modules"),
        "lonely",
        r#"{"interface": "lonely", "version": "1.0.0", "requires": {"friend": "^1"}}"#,
    );

    disuware_cmd()
        .arg("list")
        .arg(&config)
        .assert()
        .success()
        .stdout("- lonely@1.0.0\n");

    disuware_cmd()
        .args(["list", "--linked"])
        .arg(&config)
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("Found modules that can't be linked: lonely@1.0.0"));
}

#[test]
fn duplicate_modules_fail_run() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let modules = tmp.path().join("modules");
    write_module(&modules, "a", r#"{"interface": "dict", "version": "1.0.0"}"#);
    write_module(&modules, "b", r#"{"interface": "dict", "version": "1.0.0"}"#);

    disuware_cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("same interface and same version already: dict@1.0.0"));
}

#[test]
fn module_without_entry_point_fails_run() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    write_module(
        &tmp.path().join("modules"),
        "custom",
        r#"{"interface": "custom", "version": "0.1.0"}"#,
    );

    disuware_cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("No entry point 'custom@0.1.0'"));
}

#[test]
fn reader_without_its_dictionary_version_never_runs() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let modules = tmp.path().join("modules");
    write_module(&modules, "olddict", r#"{"interface": "dict", "version": "1.0.0"}"#);
    write_module(
        &modules,
        "module2",
        r#"{"interface": "module2", "version": "1.0.0", "requires": {"dict": "~2.0.0"}}"#,
    );

    disuware_cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .failure()
        .stdout(contains("says").not())
        .stderr(contains("module2@1.0.0"));
}

#[test]
fn disabled_module_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let modules = tmp.path().join("modules");
    write_module(&modules, "olddict", r#"{"interface": "dict", "version": "1.0.0"}"#);
    write_module(
        &modules,
        "module1",
        r#"{"interface": "module1", "version": "1.0.0", "requires": {"dict": "~1.0.0"}}"#,
    );
    write_module(
        &modules,
        "module2",
        r#"{"interface": "module2", "version": "1.0.0", "requires": {"dict": "~2.0.0"}, "disabled": true}"#,
    );

    disuware_cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .success()
        .stdout("Module 1 dict says old dict\n");
}
