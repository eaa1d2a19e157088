//! Workspace model: discovery, persisted config, component catalogs and
//! activation state.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   .mbox/config.json          features, repos, activation records
//!   .mbox/setting.toml         workspace settings (optional)
//!   .mbox/dependencies.lock    changed-dependencies lock
//!   MBox.dependencies.yml      current feature's user dependencies
//!   <repo working copies>/
//! ```
//!
//! # Catalogs
//!
//! The components of a repo are listed once per process by asking every
//! registered tool, then cached by repo name. Config edits never invalidate
//! the cache; only [`Workspace::invalidate_catalog`] does.

mod activation;
mod catalog;
mod config;

pub use catalog::{Component, WorkRepo};
pub use config::{ComponentActivation, Feature, RepoConfig, WorkspaceConfig};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Settings;
use crate::constants::{
    CONFIG_DIR, CONFIG_FILE, DEPENDENCIES_LOCK_FILE, USER_DEPENDENCY_FILE,
};
use crate::core::MboxError;
use crate::dependency::{UserDependency, UserDependencyFile};
use crate::tools::ToolRegistry;
use crate::utils::fs::{find_workspace_root, relative_path};

/// A loaded workspace.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    /// Global settings overlaid with the workspace settings
    pub settings: Settings,
    pub registry: ToolRegistry,
    /// Current feature's user dependencies
    pub dependencies: UserDependencyFile,
    loaded_dependencies: Vec<UserDependency>,
    catalogs: HashMap<String, WorkRepo>,
}

impl Workspace {
    /// Create `.mbox/config.json` with the default feature. Returns `false`
    /// when the workspace already exists.
    pub fn init(root: &Path) -> Result<bool> {
        let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        WorkspaceConfig::default().save(&path)?;
        info!("Initialized workspace at {}", root.display());
        Ok(true)
    }

    /// Find the workspace containing `start` and load it.
    pub fn discover(start: &Path, global: &Settings) -> Result<Self> {
        let root = find_workspace_root(start)?;
        Self::load(&root, global)
    }

    pub fn load(root: &Path, global: &Settings) -> Result<Self> {
        let settings = global.merge(&Settings::load_scope(root)?);
        let registry = ToolRegistry::from_settings(&settings)?;
        Self::load_with_registry(root, settings, registry)
    }

    /// Load with an explicit tool registry (custom providers).
    pub fn load_with_registry(
        root: &Path,
        settings: Settings,
        registry: ToolRegistry,
    ) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(MboxError::WorkspaceNotFound {
                path: root.display().to_string(),
            }
            .into());
        }
        let config = WorkspaceConfig::load(&config_path, &registry)?;
        let dependencies = UserDependencyFile::load(&root.join(USER_DEPENDENCY_FILE))?;
        if let Some(tool) = dependencies
            .dependencies
            .iter()
            .filter_map(|d| d.tools.as_ref())
            .flatten()
            .find(|tool| !registry.contains(tool))
        {
            return Err(MboxError::UnknownTool {
                name: tool.to_string(),
            })
            .with_context(|| format!("Invalid {}", dependencies.path().display()));
        }
        debug!(
            "Loaded workspace {} (feature `{}`)",
            root.display(),
            config.current_feature
        );

        Ok(Self {
            root: root.to_path_buf(),
            config,
            settings,
            registry,
            loaded_dependencies: dependencies.dependencies.clone(),
            dependencies,
            catalogs: HashMap::new(),
        })
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(CONFIG_DIR).join(DEPENDENCIES_LOCK_FILE)
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// Whether the user dependencies differ from what was loaded.
    #[must_use]
    pub fn dependencies_changed(&self) -> bool {
        self.dependencies.dependencies != self.loaded_dependencies
    }

    /// Save `MBox.dependencies.yml` when it changed.
    pub fn save_dependencies(&mut self) -> Result<()> {
        if !self.dependencies_changed() {
            return Ok(());
        }
        self.dependencies.save()?;
        self.loaded_dependencies = self.dependencies.dependencies.clone();
        Ok(())
    }

    pub fn current_feature(&self) -> Result<&Feature, MboxError> {
        self.config.current_feature()
    }

    pub fn current_feature_mut(&mut self) -> Result<&mut Feature, MboxError> {
        self.config.current_feature_mut()
    }

    /// `path` relative to the workspace root, for display and the lock.
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        relative_path(&self.root, path)
    }

    /// Settings of a repo working copy (`<repo>/.mbox/setting.toml`).
    pub fn repo_settings(&self, repo: &RepoConfig) -> Result<Settings> {
        Settings::load_scope(&repo.working_path(&self.root))
    }

    /// The catalog of a repo, listed on first use.
    pub fn catalog_for(&mut self, repo: &RepoConfig) -> &WorkRepo {
        let path = repo.working_path(&self.root);
        let registry = &self.registry;
        self.catalogs
            .entry(repo.name.to_lowercase())
            .or_insert_with(|| WorkRepo::resolve(&repo.name, &path, registry))
    }

    /// The catalog of a feature repo.
    pub fn catalog(&mut self, name: &str) -> Result<&WorkRepo> {
        let repo = self
            .current_feature()?
            .repo(name)
            .cloned()
            .ok_or_else(|| MboxError::RepoNotFound {
                name: name.to_string(),
            })?;
        Ok(self.catalog_for(&repo))
    }

    /// A feature repo for editing together with its catalog.
    pub fn repo_with_catalog(&mut self, name: &str) -> Result<(&mut RepoConfig, &WorkRepo)> {
        let root = &self.root;
        let registry = &self.registry;
        let catalogs = &mut self.catalogs;
        let repo = self
            .config
            .current_feature_mut()?
            .repo_mut(name)
            .ok_or_else(|| MboxError::RepoNotFound {
                name: name.to_string(),
            })?;
        let path = repo.working_path(root);
        let catalog = catalogs
            .entry(repo.name.to_lowercase())
            .or_insert_with(|| WorkRepo::resolve(&repo.name, &path, registry));
        Ok((repo, catalog))
    }

    /// Drop a cached catalog so the next lookup lists the repo again.
    pub fn invalidate_catalog(&mut self, name: &str) {
        self.catalogs.remove(&name.to_lowercase());
    }

    /// Every feature repo paired with its catalog.
    pub fn feature_catalogs(&mut self) -> Result<Vec<(RepoConfig, WorkRepo)>> {
        let repos = self.current_feature()?.repos.clone();
        Ok(repos
            .into_iter()
            .map(|repo| {
                let catalog = self.catalog_for(&repo).clone();
                (repo, catalog)
            })
            .collect())
    }

    /// Non-hidden directories directly under the root that are not feature repos.
    pub fn local_repo_candidates(&self) -> Result<Vec<(String, PathBuf)>> {
        let feature = self.current_feature()?;
        let mut candidates = Vec::new();
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list {}", self.root.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !path.is_dir() || feature.repo(&name).is_some() {
                continue;
            }
            candidates.push((name, path));
        }
        candidates.sort();
        Ok(candidates)
    }

    /// Switch to `name`, creating it from the current feature's repos when new.
    ///
    /// The outgoing feature keeps its user dependencies inline in the config;
    /// the incoming feature's move to `MBox.dependencies.yml`. `dependencies`
    /// replaces the incoming list. Returns `true` when the feature was created.
    pub fn start_feature(
        &mut self,
        name: &str,
        dependencies: Option<Vec<UserDependency>>,
    ) -> Result<bool> {
        let current = self.config.current_feature.clone();
        let mut created = false;
        if current != name {
            let outgoing = std::mem::take(&mut self.dependencies.dependencies);
            let repos = {
                let feature = self.config.current_feature_mut()?;
                feature.dependencies = (!outgoing.is_empty()).then_some(outgoing);
                feature.repos.clone()
            };

            let incoming = self.config.features.entry(name.to_string()).or_insert_with(|| {
                created = true;
                Feature {
                    name: name.to_string(),
                    repos,
                    dependencies: None,
                }
            });
            self.dependencies.dependencies = incoming.dependencies.take().unwrap_or_default();
            self.config.current_feature = name.to_string();
            self.catalogs.clear();
            info!(
                "{} feature `{name}` from `{current}`",
                if created { "Created" } else { "Switched to" }
            );
        }

        if let Some(dependencies) = dependencies {
            self.dependencies.dependencies = dependencies;
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DependencyTool;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        Workspace::init(&root).unwrap();
        fs::create_dir_all(root.join("Foo/Sub")).unwrap();
        fs::write(root.join("Foo/Foo.podspec"), "").unwrap();
        fs::write(root.join("Foo/Sub/Bar.podspec"), "").unwrap();
        let ws = Workspace::load(&root, &Settings::default()).unwrap();
        (temp, ws)
    }

    #[test]
    fn test_init_is_idempotent() {
        let (_temp, ws) = workspace();
        assert!(!Workspace::init(&ws.root).unwrap());
    }

    #[test]
    fn test_load_without_config_fails() {
        let temp = TempDir::new().unwrap();
        let err = Workspace::load(temp.path(), &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MboxError>(),
            Some(MboxError::WorkspaceNotFound { .. })
        ));
    }

    #[test]
    fn test_repo_with_catalog_lists_components() {
        let (_temp, mut ws) = workspace();
        ws.current_feature_mut().unwrap().repos.push(RepoConfig::new("Foo"));

        let (repo, catalog) = ws.repo_with_catalog("foo").unwrap();
        let pods = DependencyTool::new("cocoapods");
        assert_eq!(catalog.components_for(&pods).len(), 2);
        repo.deactivate_all(&[pods.clone()]);

        assert!(ws.current_feature().unwrap().repos[0].activation(&pods).is_some());
        assert!(ws.repo_with_catalog("Missing").is_err());
    }

    #[test]
    fn test_local_repo_candidates_skip_hidden_and_added() {
        let (_temp, mut ws) = workspace();
        fs::create_dir_all(ws.root.join("Other")).unwrap();
        let names: Vec<String> =
            ws.local_repo_candidates().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Foo", "Other"]);

        ws.current_feature_mut().unwrap().repos.push(RepoConfig::new("Foo"));
        let names: Vec<String> =
            ws.local_repo_candidates().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Other"]);
    }

    #[test]
    fn test_start_feature_moves_dependencies() {
        let (_temp, mut ws) = workspace();
        ws.current_feature_mut().unwrap().repos.push(RepoConfig::new("Foo"));
        ws.dependencies.add(UserDependency::new("Baz", None));

        assert!(ws.start_feature("Feat", None).unwrap());
        assert_eq!(ws.config.current_feature, "Feat");
        assert!(ws.dependencies.dependencies.is_empty());
        assert_eq!(ws.current_feature().unwrap().repos.len(), 1);
        let free = &ws.config.features["FreeMode"];
        assert_eq!(free.dependencies.as_ref().unwrap().len(), 1);

        assert!(!ws.start_feature("FreeMode", None).unwrap());
        assert_eq!(ws.dependencies.dependencies.len(), 1);
        assert!(ws.config.features["FreeMode"].dependencies.is_none());
    }

    #[test]
    fn test_save_dependencies_only_when_changed() {
        let (_temp, mut ws) = workspace();
        let path = ws.root.join(USER_DEPENDENCY_FILE);
        ws.dependencies.add(UserDependency::new("Baz", None));
        assert!(ws.dependencies_changed());
        ws.save_dependencies().unwrap();
        assert!(path.exists());
        assert!(!ws.dependencies_changed());
    }
}
