use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;
use mbox_dependency_manager::test_utils::TestWorkspaceBuilder;

#[test]
fn test_add_repo_activates_everything() {
    let project = TestProject::with_foo().unwrap();
    project
        .cmd()
        .args(["add", "Foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added repo `Foo`"));

    let repo = project.repo("Foo").unwrap();
    assert_eq!(repo["components"], json!([]));
}

#[test]
fn test_add_with_component_deactivates_other_tools() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo", "--component", "Bar"]);

    let repo = project.repo("Foo").unwrap();
    let components = repo["components"].as_array().unwrap();
    assert!(components.contains(&json!({"tool": "cocoapods", "active": ["Bar"]})));
    assert!(components.contains(&json!({"tool": "bundler", "active": []})));
}

#[test]
fn test_add_with_component_scoped_to_tool() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo", "--component", "Bar", "--tool", "cocoapods"]);

    let repo = project.repo("Foo").unwrap();
    let components = repo["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);
    assert!(components.contains(&json!({"tool": "bundler", "active": []})));
}

#[test]
fn test_add_by_component_name() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Bar"]);

    let repo = project.repo("Foo").unwrap();
    let components = repo["components"].as_array().unwrap();
    assert!(components.contains(&json!({"tool": "cocoapods", "active": ["Bar"]})));
}

#[test]
fn test_add_without_activation_deactivates_all() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo", "--no-activate-all-components"]);

    let repo = project.repo("Foo").unwrap();
    let components = repo["components"].as_array().unwrap();
    assert!(components.contains(&json!({"tool": "cocoapods", "active": []})));
    assert!(components.contains(&json!({"tool": "bundler", "active": []})));
}

#[test]
fn test_add_removes_overrides_of_provided_packages() {
    let project = TestProject::from_builder(
        TestWorkspaceBuilder::new()
            .unwrap()
            .with_repo("Foo", &["Foo.podspec", "Sub/Bar.podspec"])
            .with_file("MBox.dependencies.yml", "- name: Bar\n  version: 1.0.0\n- name: Baz\n  version: '2.0'\n"),
    )
    .unwrap();
    project.run_ok(&["add", "Foo"]);

    let names: Vec<String> = project
        .user_dependencies()
        .unwrap()
        .iter()
        .filter_map(|d| d.name().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["Baz"]);
}

#[test]
fn test_add_writes_component_paths_to_lock() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);

    let lock = project.lock().unwrap();
    assert_eq!(lock["cocoapods"]["Bar"], json!({"path": "Foo"}));
    assert_eq!(lock["cocoapods"]["Foo"], json!({"path": "Foo"}));
}

#[test]
fn test_remove_repo() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project
        .cmd()
        .args(["remove", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed repo `Foo`"));
    assert!(project.repo("Foo").is_err());
}
