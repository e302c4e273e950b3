//! E2E tests running the `disuware` binary against the consoledicts fixture.
//!
//! Module output goes to stdout; logs (warn and above by default) go to stderr.

mod common;

use common::{disuware_cmd, fixture_config};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn stdout_of(args: &[&str]) -> String {
    let output = disuware_cmd()
        .args(args)
        .arg(fixture_config("consoledicts"))
        .assert()
        .success()
        .stderr("")
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("utf8 stdout")
}

// ─── run ───────────────────────────────────────────────────────────

#[test]
fn run_prints_one_line_per_reader() {
    disuware_cmd()
        .arg("run")
        .arg(fixture_config("consoledicts"))
        .assert()
        .success()
        .stderr("")
        .stdout("Module 1 dict says old dict\nModule 2 dict says new dict\n");
}

#[test]
fn run_verbose_logs_to_stderr() {
    disuware_cmd()
        .args(["-v", "run"])
        .arg(fixture_config("consoledicts"))
        .assert()
        .success()
        .stdout(contains("Module 1 dict says old dict"))
        .stderr(contains("Module module1@1.0.0 is initialized"))
        .stderr(contains("Bound dict@~2.0.0 to dict@2.0.0 for module2@1.0.0"));
}

// ─── list ──────────────────────────────────────────────────────────

#[test]
fn list_in_discovery_order() {
    assert_eq!(
        stdout_of(&["list"]),
        "- module1@1.0.0\n- module2@1.0.0\n- dict@2.0.0\n- dict@1.0.0\n"
    );
}

#[test]
fn list_linked() {
    assert_eq!(
        stdout_of(&["list", "--linked"]),
        "- dict@2.0.0\n- dict@1.0.0\n- module1@1.0.0\n- module2@1.0.0\n"
    );
}

#[test]
fn list_dependencies() {
    assert_eq!(
        stdout_of(&["list", "--dependencies"]),
        "- module1@1.0.0\n|- dict@~1.0.0\n- module2@1.0.0\n|- dict@~2.0.0\n- dict@2.0.0\n- dict@1.0.0\n"
    );
}

#[test]
fn list_linked_with_dependencies_short_flags() {
    assert_eq!(
        stdout_of(&["list", "-d", "-l"]),
        "- dict@2.0.0\n- dict@1.0.0\n- module1@1.0.0\n|- dict@~1.0.0\n- module2@1.0.0\n|- dict@~2.0.0\n"
    );
}

#[test]
fn list_does_not_start_modules() {
    disuware_cmd()
        .arg("list")
        .arg(fixture_config("consoledicts"))
        .assert()
        .success()
        .stdout(contains("says").not());
}
