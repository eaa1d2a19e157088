//! Shared helpers for driving the `mbox-dp` binary against a temporary
//! workspace.

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;

use mbox_dependency_manager::dependency::UserDependency;
use mbox_dependency_manager::test_utils::{TestWorkspace, TestWorkspaceBuilder};

/// A temporary workspace plus an isolated global settings path.
pub struct TestProject {
    workspace: TestWorkspace,
}

impl TestProject {
    /// A workspace with repo `Foo` exposing CocoaPods components `Foo`
    /// and `Bar`, and Bundler component `Foo`.
    pub fn with_foo() -> Result<Self> {
        Self::from_builder(
            TestWorkspaceBuilder::new()?
                .with_repo("Foo", &["Foo.podspec", "Sub/Bar.podspec", "Foo.gemspec"]),
        )
    }

    pub fn from_builder(builder: TestWorkspaceBuilder) -> Result<Self> {
        Ok(Self {
            workspace: builder.build()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.workspace.root()
    }

    /// `mbox-dp` pointed at this workspace, with global settings isolated
    /// from the user's home directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("mbox-dp").expect("binary is built for integration tests");
        cmd.env("MBOX_CONFIG", self.root().join(".mbox/global-setting.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--workspace")
            .arg(self.root());
        cmd
    }

    /// Run `mbox-dp <args>` and require success.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success();
        String::from_utf8_lossy(&output.get_output().stdout).into_owned()
    }

    pub fn config(&self) -> Result<Value> {
        read_json(&self.root().join(".mbox/config.json"))
    }

    pub fn lock(&self) -> Result<Value> {
        read_json(&self.root().join(".mbox/dependencies.lock"))
    }

    /// The persisted repo entry of the current feature.
    pub fn repo(&self, name: &str) -> Result<Value> {
        let config = self.config()?;
        let feature = config["current_feature"].as_str().context("no current feature")?;
        config["features"][feature]["repos"]
            .as_array()
            .and_then(|repos| repos.iter().find(|r| r["name"] == name))
            .cloned()
            .with_context(|| format!("repo `{name}` is not in feature `{feature}`"))
    }

    pub fn user_dependencies(&self) -> Result<Vec<UserDependency>> {
        let path = self.root().join("MBox.dependencies.yml");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str::<Option<Vec<UserDependency>>>(&content)?.unwrap_or_default())
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}
