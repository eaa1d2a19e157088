use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_unknown_tool_fails() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project
        .cmd()
        .args(["activate", "Bar", "--tool", "gradle"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("The dependency tool `gradle` is not found"));
}

#[test]
fn test_unknown_component_fails() {
    let project = TestProject::with_foo().unwrap();
    project
        .cmd()
        .args(["add", "Foo", "--component", "Missing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not find component which named `Missing`"));
}

#[test]
fn test_unknown_repo_fails() {
    let project = TestProject::with_foo().unwrap();
    project
        .cmd()
        .args(["add", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find repo which named `Nowhere`"));
}

#[test]
fn test_outside_workspace_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("mbox-dp").unwrap();
    cmd.env("MBOX_CONFIG", temp.path().join("setting.toml"))
        .arg("--workspace")
        .arg(temp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not inside an MBox workspace"));
}
