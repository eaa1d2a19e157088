//! The changed-dependencies lock (`.mbox/dependencies.lock`).
//!
//! The lock tells the dependency tools which packages deviate from what the
//! project manifests declare. It is derived state: every mutating command
//! recomputes it from the current feature and rewrites it whole.
//!
//! # Format
//!
//! Pretty-printed JSON with sorted keys, one object per tool:
//!
//! ```json
//! {
//!   "cocoapods": {
//!     "Bar": { "path": "Foo" },
//!     "Baz": { "version": "2.0" }
//!   }
//! }
//! ```
//!
//! User dependency overrides contribute their fields (minus `name`). Every
//! name a feature repo activates for the tool contributes `{"path": <repo path>}`,
//! relative to the workspace root, and takes precedence over an override of
//! the same name. Tools with no entries are omitted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::DependencyTool;
use crate::utils::fs::{read_json_file, write_json_file};
use crate::workspace::Workspace;

/// Changed dependencies of one tool, by package name.
pub type ToolDependencies = BTreeMap<String, Value>;

/// The whole lock, by tool name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyLock {
    tools: BTreeMap<String, ToolDependencies>,
}

impl DependencyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the lock for the workspace's current feature.
    pub fn compute(workspace: &mut Workspace) -> Result<Self> {
        let mut lock = Self::new();
        for tool in workspace.registry.all_tools() {
            let entries = changed_dependencies_for(workspace, &tool)?;
            if !entries.is_empty() {
                lock.tools.insert(tool.to_string(), entries);
            }
        }
        Ok(lock)
    }

    /// Load a lock file. A missing file is an empty lock.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        read_json_file(path).with_context(|| format!("Failed to load lock {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self, true)
    }

    #[must_use]
    pub fn tool(&self, tool: &DependencyTool) -> Option<&ToolDependencies> {
        self.tools.get(tool.name())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn tools(&self) -> &BTreeMap<String, ToolDependencies> {
        &self.tools
    }
}

/// Changed dependencies for one tool.
pub fn changed_dependencies_for(
    workspace: &mut Workspace,
    tool: &DependencyTool,
) -> Result<ToolDependencies> {
    let mut entries = ToolDependencies::new();

    for dependency in workspace.dependencies.dependencies_for(Some(tool)) {
        let Some(name) = dependency.name() else {
            continue;
        };
        let mut value = serde_json::to_value(dependency)?;
        if let Value::Object(fields) = &mut value {
            fields.remove("name");
        }
        entries.insert(name.to_string(), value);
    }

    for (repo, catalog) in workspace.feature_catalogs()? {
        let path = workspace.relative_path(&repo.working_path(&workspace.root));
        for name in repo.activated_components(tool, &catalog) {
            entries.insert(name, serde_json::json!({ "path": path }));
        }
    }
    Ok(entries)
}

/// Recompute the lock and write it to `.mbox/dependencies.lock`.
pub fn save_changed_dependencies_lock(workspace: &mut Workspace) -> Result<DependencyLock> {
    let lock = DependencyLock::compute(workspace)?;
    let path = workspace.lock_path();
    lock.save(&path)?;
    debug!("Saved {}", path.display());
    Ok(lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::dependency::{DependencyChange, UserDependency};
    use crate::workspace::{ComponentActivation, RepoConfig};
    use std::fs;
    use tempfile::TempDir;

    fn pods() -> DependencyTool {
        DependencyTool::new("cocoapods")
    }

    fn workspace() -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        Workspace::init(&root).unwrap();
        fs::create_dir_all(root.join("Foo/Sub")).unwrap();
        fs::write(root.join("Foo/Foo.podspec"), "").unwrap();
        fs::write(root.join("Foo/Sub/Bar.podspec"), "").unwrap();
        let mut ws = Workspace::load(&root, &Settings::default()).unwrap();
        ws.current_feature_mut().unwrap().repos.push(RepoConfig::new("Foo"));
        (temp, ws)
    }

    #[test]
    fn test_active_components_point_at_repo() {
        let (_temp, mut ws) = workspace();
        let entries = changed_dependencies_for(&mut ws, &pods()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["Bar"], serde_json::json!({"path": "Foo"}));

        let (repo, catalog) = ws.repo_with_catalog("Foo").unwrap();
        let bar = catalog.fetch_component("Bar", &pods()).unwrap().clone();
        repo.deactivate_component(&bar, catalog);
        let entries = changed_dependencies_for(&mut ws, &pods()).unwrap();
        assert!(!entries.contains_key("Bar"));
    }

    #[test]
    fn test_recorded_names_are_locked_as_stored() {
        let (_temp, mut ws) = workspace();
        ws.current_feature_mut().unwrap().repos[0].components.push(ComponentActivation {
            tool: pods(),
            active: vec!["Bar".to_string(), "Gone".to_string()],
        });
        let entries = changed_dependencies_for(&mut ws, &pods()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["Gone"], serde_json::json!({"path": "Foo"}));
        assert!(!entries.contains_key("Foo"));
    }

    #[test]
    fn test_user_dependencies_respect_tool_scope() {
        let (_temp, mut ws) = workspace();
        let mut baz = UserDependency::new("Baz", Some(&DependencyTool::new("bundler")));
        baz.dependency.change(DependencyChange {
            version: Some("2.0".to_string()),
            ..Default::default()
        });
        ws.dependencies.add(baz);
        ws.dependencies.add(UserDependency::new("Qux", None));

        let lock = DependencyLock::compute(&mut ws).unwrap();
        let bundler = lock.tool(&DependencyTool::new("bundler")).unwrap();
        assert_eq!(
            bundler["Baz"],
            serde_json::json!({"version": "2.0", "tools": ["bundler"]})
        );
        assert!(!lock.tool(&pods()).unwrap().contains_key("Baz"));
        assert!(lock.tool(&pods()).unwrap().contains_key("Qux"));
    }

    #[test]
    fn test_save_writes_sorted_pretty_json() {
        let (_temp, mut ws) = workspace();
        let lock = save_changed_dependencies_lock(&mut ws).unwrap();
        let content = fs::read_to_string(ws.lock_path()).unwrap();
        assert!(content.find("\"Bar\"").unwrap() < content.find("\"Foo\"").unwrap());
        assert!(content.contains("\n  \"cocoapods\""));
        assert_eq!(DependencyLock::load(&ws.lock_path()).unwrap(), lock);
    }

    #[test]
    fn test_missing_lock_loads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(DependencyLock::load(&temp.path().join("none.lock")).unwrap().is_empty());
    }
}
