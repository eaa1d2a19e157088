use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

#[test]
fn test_init_creates_workspace() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("mbox-dp").unwrap();
    cmd.env("MBOX_CONFIG", temp.path().join("setting.toml"))
        .arg("--workspace")
        .arg(temp.path())
        .arg("init")
        .assert()
        .success();

    let content = std::fs::read_to_string(temp.path().join(".mbox/config.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(config["current_feature"], "FreeMode");
}

#[test]
fn test_feature_start_copies_repos_and_moves_dependencies() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project.run_ok(&["depend", "Baz", "--version", "2.0"]);

    project
        .cmd()
        .args(["feature", "start", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feature `login`"));

    let config = project.config().unwrap();
    assert_eq!(config["current_feature"], "login");
    assert_eq!(config["features"]["login"]["repos"][0]["name"], "Foo");
    assert_eq!(
        config["features"]["FreeMode"]["dependencies"],
        json!([{"name": "Baz", "version": "2.0"}])
    );
    assert!(project.user_dependencies().unwrap().is_empty());

    // switching back restores the overrides
    project.run_ok(&["feature", "start", "FreeMode"]);
    let records = project.user_dependencies().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(), Some("Baz"));
}

#[test]
fn test_feature_start_with_dependencies_json() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&[
        "feature",
        "start",
        "release",
        "--dependencies",
        r#"{"Baz": {"version": "3.0"}}"#,
    ]);

    let records = project.user_dependencies().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(), Some("Baz"));
    assert_eq!(records[0].dependency.version.as_deref(), Some("3.0"));
}

#[test]
fn test_feature_start_rejects_invalid_json() {
    let project = TestProject::with_foo().unwrap();
    project
        .cmd()
        .args(["feature", "start", "release", "--dependencies", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid dependencies JSON"));
}
