use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

#[test]
fn test_depend_version_then_reset() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["depend", "Baz", "--version", "2.0"]);

    let records = project.user_dependencies().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(), Some("Baz"));
    assert_eq!(records[0].dependency.version.as_deref(), Some("2.0"));
    assert!(records[0].tools.is_none());
    assert_eq!(project.lock().unwrap()["cocoapods"]["Baz"], json!({"version": "2.0"}));

    project
        .cmd()
        .args(["depend", "Baz", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset dependency `Baz`"));
    assert!(project.user_dependencies().unwrap().is_empty());
}

#[test]
fn test_depend_git_clears_version() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["depend", "Baz", "--version", "2.0"]);
    project.run_ok(&[
        "depend",
        "Baz",
        "--git",
        "https://github.com/example/Baz.git",
        "--branch",
        "develop",
    ]);

    let records = project.user_dependencies().unwrap();
    assert_eq!(records.len(), 1);
    let dependency = &records[0].dependency;
    assert_eq!(dependency.version, None);
    assert_eq!(dependency.git.as_deref(), Some("https://github.com/example/Baz.git"));
    assert_eq!(dependency.branch.as_deref(), Some("develop"));
}

#[test]
fn test_depend_scoped_to_tool() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["depend", "Baz", "--version", "2.0", "--tool", "bundler"]);

    let records = project.user_dependencies().unwrap();
    assert_eq!(records.len(), 1);
    let scope: Vec<String> = records[0].tools.as_ref().unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(scope, vec!["bundler"]);

    let lock = project.lock().unwrap();
    assert_eq!(lock["bundler"]["Baz"], json!({"version": "2.0", "tools": ["bundler"]}));
    assert!(lock.get("cocoapods").is_none());
}

#[test]
fn test_depend_shows_missing_record() {
    let project = TestProject::with_foo().unwrap();
    project
        .cmd()
        .args(["depend", "Baz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No configure for dependency `Baz`."));

    project
        .cmd()
        .arg("depend")
        .assert()
        .success()
        .stdout(predicate::str::contains("No configure custom dependencies."));
}

#[test]
fn test_depend_rejects_package_of_feature_repo() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project
        .cmd()
        .args(["depend", "Bar", "--version", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contains the package `Bar`"));
    assert!(project.user_dependencies().unwrap().is_empty());
}

#[test]
fn test_depend_show_changes_prints_lock() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["depend", "Baz", "--version", "2.0"]);

    let stdout = project.run_ok(&["depend", "--show-changes", "--tool", "cocoapods"]);
    let changes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(changes, json!({"Baz": {"version": "2.0"}}));
}
