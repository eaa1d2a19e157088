use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

fn record(project: &TestProject, tool: &str) -> Option<serde_json::Value> {
    let repo = project.repo("Foo").unwrap();
    repo["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["tool"] == tool)
        .map(|c| c["active"].clone())
}

#[test]
fn test_deactivate_then_activate_component() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);

    project.run_ok(&["deactivate", "Foo/Bar"]);
    assert_eq!(record(&project, "cocoapods"), Some(json!(["Foo"])));

    project.run_ok(&["activate", "Bar"]);
    let active = record(&project, "cocoapods").unwrap();
    let mut names: Vec<&str> = active.as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Bar", "Foo"]);
}

#[test]
fn test_deactivate_all_then_activate_all() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);

    project.run_ok(&["deactivate", "--all"]);
    assert_eq!(record(&project, "cocoapods"), Some(json!([])));
    assert_eq!(record(&project, "bundler"), Some(json!([])));

    project.run_ok(&["activate", "--all"]);
    assert_eq!(record(&project, "cocoapods"), None);
    assert_eq!(record(&project, "bundler"), None);
}

#[test]
fn test_deactivate_repo_for_one_tool() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project.run_ok(&["deactivate", "Foo/*", "--tool", "bundler"]);

    assert_eq!(record(&project, "bundler"), Some(json!([])));
    assert_eq!(record(&project, "cocoapods"), None);
}

#[test]
fn test_activate_requires_names_or_all() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo"]);
    project
        .cmd()
        .arg("activate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Require component names"));
}

#[test]
fn test_status_json_reflects_activation() {
    let project = TestProject::with_foo().unwrap();
    project.run_ok(&["add", "Foo", "--component", "Bar"]);

    let stdout = project.run_ok(&["status", "--json"]);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let components = status["repos"][0]["components"].as_array().unwrap();
    assert!(components.contains(&json!({"name": "Bar", "tool": "cocoapods", "active": true})));
    assert!(components.contains(&json!({"name": "Foo", "tool": "cocoapods", "active": false})));
    assert!(components.contains(&json!({"name": "Foo", "tool": "bundler", "active": false})));
}
