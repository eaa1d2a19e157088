//! `.mbox/config.json`: features, their repos and component activation records.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::FREE_MODE_FEATURE;
use crate::core::{DependencyTool, MboxError};
use crate::dependency::{Dependency, GitPointer, UserDependency};
use crate::tools::ToolRegistry;
use crate::utils::fs::{expand_path, read_json_file, write_json_file};

/// The persisted activation record of one tool inside a repo.
///
/// A missing record means every component of the tool is active; an empty
/// `active` list means none is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentActivation {
    pub tool: DependencyTool,
    #[serde(default)]
    pub active: Vec<String>,
}

impl ComponentActivation {
    pub fn new(tool: DependencyTool) -> Self {
        Self {
            tool,
            active: Vec::new(),
        }
    }
}

/// A repository tracked by a feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Working copy, relative to the workspace root or absolute. Defaults to `<root>/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_git_pointer: Option<GitPointer>,
    #[serde(default)]
    pub components: Vec<ComponentActivation>,
}

impl RepoConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Seed a repo from a resolved dependency: git url, local path and git pointer.
    pub fn from_dependency(name: impl Into<String>, dependency: &Dependency) -> Self {
        Self {
            name: name.into(),
            url: dependency.git.clone(),
            path: dependency.path.clone(),
            base_git_pointer: dependency.git_pointer(),
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn working_path(&self, root: &Path) -> PathBuf {
        match &self.path {
            Some(path) => expand_path(path, root),
            None => root.join(&self.name),
        }
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A branch-like unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
    /// Inline overrides of a feature that is not current; the current
    /// feature keeps them in `MBox.dependencies.yml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<UserDependency>>,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn repo(&self, name: &str) -> Option<&RepoConfig> {
        self.repos.iter().find(|r| r.is_named(name))
    }

    pub fn repo_mut(&mut self, name: &str) -> Option<&mut RepoConfig> {
        self.repos.iter_mut().find(|r| r.is_named(name))
    }

    /// Remove a repo, returning it when it was present.
    pub fn remove_repo(&mut self, name: &str) -> Option<RepoConfig> {
        let index = self.repos.iter().position(|r| r.is_named(name))?;
        Some(self.repos.remove(index))
    }
}

/// The whole workspace config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub current_feature: String,
    #[serde(default)]
    pub features: BTreeMap<String, Feature>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        let mut features = BTreeMap::new();
        features.insert(FREE_MODE_FEATURE.to_string(), Feature::new(FREE_MODE_FEATURE));
        Self {
            current_feature: FREE_MODE_FEATURE.to_string(),
            features,
        }
    }
}

impl WorkspaceConfig {
    /// Load the config and check every activation record against the registry.
    pub fn load(path: &Path, registry: &ToolRegistry) -> Result<Self> {
        let config: Self = read_json_file(path)
            .with_context(|| format!("Failed to load workspace config {}", path.display()))?;
        config.validate_tools(registry)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self, true)
    }

    /// Every tool referenced by persisted state must be registered.
    pub fn validate_tools(&self, registry: &ToolRegistry) -> Result<(), MboxError> {
        let records = self
            .features
            .values()
            .flat_map(|f| &f.repos)
            .flat_map(|r| &r.components)
            .map(|c| &c.tool);
        let scopes = self
            .features
            .values()
            .filter_map(|f| f.dependencies.as_ref())
            .flatten()
            .filter_map(|d| d.tools.as_ref())
            .flatten();

        match records.chain(scopes).find(|tool| !registry.contains(tool)) {
            Some(tool) => Err(MboxError::UnknownTool {
                name: tool.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn current_feature(&self) -> Result<&Feature, MboxError> {
        self.features.get(&self.current_feature).ok_or_else(|| self.missing_feature())
    }

    pub fn current_feature_mut(&mut self) -> Result<&mut Feature, MboxError> {
        let name = self.current_feature.clone();
        let missing = self.missing_feature();
        self.features.get_mut(&name).ok_or(missing)
    }

    fn missing_feature(&self) -> MboxError {
        MboxError::ConfigParseError {
            file: crate::constants::CONFIG_FILE.to_string(),
            reason: format!("current feature `{}` is not defined", self.current_feature),
        }
    }
}
