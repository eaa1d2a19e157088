//! Temporary workspace builder for tests.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::cli::common::CommandContext;
use crate::config::Settings;
use crate::constants::{CONFIG_DIR, SETTING_FILE};
use crate::workspace::{RepoConfig, Workspace};

/// A builder for temporary workspaces with a fluent API.
pub struct TestWorkspaceBuilder {
    temp_dir: TempDir,
    root: PathBuf,
    files: Vec<(String, String)>,
    feature_repos: Vec<String>,
}

impl TestWorkspaceBuilder {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        // canonical so paths compare equal on platforms with symlinked temp dirs
        let root = temp_dir.path().canonicalize()?;
        Ok(Self {
            temp_dir,
            root,
            files: Vec::new(),
            feature_repos: Vec::new(),
        })
    }

    /// Create a repo working copy containing empty manifest files.
    pub fn with_repo(mut self, name: &str, manifests: &[&str]) -> Self {
        for manifest in manifests {
            self.files.push((format!("{name}/{manifest}"), String::new()));
        }
        if manifests.is_empty() {
            self.files.push((format!("{name}/.keep"), String::new()));
        }
        self
    }

    /// Also register the repo in the current feature.
    pub fn with_feature_repo(mut self, name: &str, manifests: &[&str]) -> Self {
        self.feature_repos.push(name.to_string());
        self.with_repo(name, manifests)
    }

    /// Write `content` to `path`, relative to the workspace root.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Write the workspace settings file.
    pub fn with_settings(self, toml: &str) -> Self {
        self.with_file(format!("{CONFIG_DIR}/{SETTING_FILE}"), toml)
    }

    pub fn build(self) -> Result<TestWorkspace> {
        Workspace::init(&self.root)?;
        for (path, content) in &self.files {
            let full = self.root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full, content)?;
        }

        if !self.feature_repos.is_empty() {
            let mut workspace = Workspace::load(&self.root, &Settings::default())?;
            let feature = workspace.current_feature_mut()?;
            for name in &self.feature_repos {
                feature.repos.push(RepoConfig::new(name.clone()));
            }
            workspace.save_config()?;
        }

        Ok(TestWorkspace {
            _temp_dir: self.temp_dir,
            root: self.root,
        })
    }
}

/// A workspace living in a temporary directory, removed on drop.
pub struct TestWorkspace {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the workspace with default global settings.
    pub fn load(&self) -> Result<Workspace> {
        Workspace::load(&self.root, &Settings::default())
    }

    /// A command context over the workspace with default global settings.
    pub fn context(&self) -> Result<CommandContext> {
        Ok(CommandContext::new(self.load()?))
    }
}
