//! Per-repository component catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::DependencyTool;
use crate::tools::ToolRegistry;

/// A named sub-package a repo exposes for one tool.
///
/// `repo_name` is a handle to the owning repo; look it up through the feature.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub tool: DependencyTool,
    pub repo_name: String,
    /// Directory of the component; the repo's working copy unless a spec path is set.
    pub path: PathBuf,
    /// Manifest path relative to the repo.
    pub spec_path: Option<String>,
    /// Tool-specific manifest payload, opaque here.
    pub spec: Option<serde_json::Value>,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        tool: DependencyTool,
        repo_name: impl Into<String>,
        repo_path: &Path,
    ) -> Self {
        Self {
            name: name.into(),
            tool,
            repo_name: repo_name.into(),
            path: repo_path.to_path_buf(),
            spec_path: None,
            spec: None,
        }
    }

    /// Attach the manifest; the component path becomes the manifest's directory.
    #[must_use]
    pub fn with_spec_path(mut self, spec_path: &str, repo_path: &Path) -> Self {
        let absolute = repo_path.join(spec_path);
        if let Some(dir) = absolute.parent() {
            self.path = dir.to_path_buf();
        }
        self.spec_path = Some(spec_path.to_string());
        self
    }

    #[must_use]
    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Case-insensitive name match. `repo/name` also matches when the repo
    /// part names the owning repo.
    #[must_use]
    pub fn is_name(&self, name: &str) -> bool {
        if self.name.eq_ignore_ascii_case(name) {
            return true;
        }
        match name.split_once('/') {
            Some((repo, rest)) => {
                self.repo_name.eq_ignore_ascii_case(repo) && self.name.eq_ignore_ascii_case(rest)
            }
            None => false,
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        if self.tool != other.tool || !self.is_name(&other.name) {
            return false;
        }
        match (&self.spec_path, &other.spec_path) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// The components of one repository's working copy, grouped by tool.
///
/// Built once from the tool registry; recreate it to pick up changes on disk.
#[derive(Debug, Clone, Default)]
pub struct WorkRepo {
    pub name: String,
    pub path: PathBuf,
    by_tool: BTreeMap<DependencyTool, Vec<Component>>,
}

impl WorkRepo {
    /// Ask every registered tool for the repo's components.
    ///
    /// A failing provider contributes nothing and is logged.
    pub fn resolve(name: &str, path: &Path, registry: &ToolRegistry) -> Self {
        let mut components = Vec::new();
        for provider in registry.providers() {
            match provider.resolve_components(name, path) {
                Ok(found) => components.extend(found),
                Err(e) => warn!("[{name}] Failed to list {} components: {e:#}", provider.tool()),
            }
        }
        Self::from_components(name, path, components)
    }

    /// Group components by tool, dropping duplicates.
    pub fn from_components(name: &str, path: &Path, components: Vec<Component>) -> Self {
        let mut by_tool: BTreeMap<DependencyTool, Vec<Component>> = BTreeMap::new();
        for component in components {
            let items = by_tool.entry(component.tool.clone()).or_default();
            if !items.contains(&component) {
                items.push(component);
            }
        }
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            by_tool,
        }
    }

    #[must_use]
    pub fn components_by_tool(&self) -> &BTreeMap<DependencyTool, Vec<Component>> {
        &self.by_tool
    }

    /// Tools that see at least one component here.
    #[must_use]
    pub fn tools(&self) -> Vec<DependencyTool> {
        self.by_tool.keys().cloned().collect()
    }

    /// All components across tools.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.by_tool.values().flatten()
    }

    #[must_use]
    pub fn components_for(&self, tool: &DependencyTool) -> &[Component] {
        self.by_tool.get(tool).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn fetch_component(&self, name: &str, tool: &DependencyTool) -> Option<&Component> {
        self.components_for(tool).iter().find(|c| c.is_name(name))
    }

    /// Components of `tool` matching any of `names`, in catalog order.
    #[must_use]
    pub fn fetch_components(&self, names: &[String], tool: &DependencyTool) -> Vec<&Component> {
        self.components_for(tool)
            .iter()
            .filter(|c| names.iter().any(|n| c.is_name(n)))
            .collect()
    }

    /// Components of any tool matching `name`.
    #[must_use]
    pub fn fetch_components_named(&self, name: &str) -> Vec<&Component> {
        self.components().filter(|c| c.is_name(name)).collect()
    }

    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.components().any(|c| c.is_name(name))
    }

    /// The repo name plus every component name, deduplicated.
    #[must_use]
    pub fn package_names(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        for component in self.components() {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&component.name)) {
                names.push(component.name.clone());
            }
        }
        names
    }
}
