//! Layered TOML settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{CONFIG_DIR, CONFIG_ENV, SETTING_FILE};
use crate::utils::fs::read_toml_file;

/// How to read a bare name that matches both a repo and one of its components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbiguityPolicy {
    /// The repo match wins: the name targets the whole repo.
    #[default]
    #[serde(rename = "repo")]
    PreferRepo,
    /// The component match wins: only that component is targeted.
    #[serde(rename = "component")]
    PreferComponent,
}

/// A dependency tool and the manifest file patterns its components are found by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ToolDefinition {
    fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Built-in tools used when no `[[dependency_manager.tools]]` is configured.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("cocoapods", &["*.podspec", "*.podspec.json"]),
            Self::new("bundler", &["*.gemspec"]),
        ]
    }
}

/// The `[dependency_manager]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyManagerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activate_all_components_after_add_repo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguous_name_policy: Option<AmbiguityPolicy>,
    /// Registry index file, relative to the workspace root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl DependencyManagerSettings {
    fn merge(&self, over: &Self) -> Self {
        Self {
            activate_all_components_after_add_repo: over
                .activate_all_components_after_add_repo
                .or(self.activate_all_components_after_add_repo),
            ambiguous_name_policy: over.ambiguous_name_policy.or(self.ambiguous_name_policy),
            registry: over.registry.clone().or_else(|| self.registry.clone()),
            tools: over.tools.clone().or_else(|| self.tools.clone()),
        }
    }
}

/// One settings layer.
///
/// # Examples
///
/// ```rust,no_run
/// use mbox_dependency_manager::config::Settings;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let global = Settings::load_global(None)?;
/// let workspace = Settings::load_scope(Path::new("/work/space"))?;
/// let merged = global.merge(&workspace);
/// println!("{:?}", merged.activate_all_components_after_add_repo());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_manager: Option<DependencyManagerSettings>,
}

impl Settings {
    /// The global settings path: `$MBOX_CONFIG`, else `~/.mbox/setting.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(CONFIG_DIR).join(SETTING_FILE))
    }

    /// Load a settings file. A missing file is an empty layer.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!("No settings at {}", path.display());
            return Ok(Self::default());
        }
        read_toml_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))
    }

    /// Load the global layer, from `path` when given.
    pub fn load_global(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::default_path()?),
        }
    }

    /// Load `<dir>/.mbox/setting.toml` (workspace root or repo working copy).
    pub fn load_scope(dir: &Path) -> Result<Self> {
        Self::load_from(&dir.join(CONFIG_DIR).join(SETTING_FILE))
    }

    /// Overlay `over` onto `self`, field by field.
    #[must_use]
    pub fn merge(&self, over: &Settings) -> Settings {
        let dependency_manager = match (&self.dependency_manager, &over.dependency_manager) {
            (Some(base), Some(over)) => Some(base.merge(over)),
            (base, over) => over.clone().or_else(|| base.clone()),
        };
        Settings { dependency_manager }
    }

    #[must_use]
    pub fn activate_all_components_after_add_repo(&self) -> Option<bool> {
        self.dependency_manager
            .as_ref()
            .and_then(|dm| dm.activate_all_components_after_add_repo)
    }

    #[must_use]
    pub fn ambiguous_name_policy(&self) -> AmbiguityPolicy {
        self.dependency_manager
            .as_ref()
            .and_then(|dm| dm.ambiguous_name_policy)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn registry(&self) -> Option<&str> {
        self.dependency_manager.as_ref().and_then(|dm| dm.registry.as_deref())
    }

    /// Configured tools, or [`ToolDefinition::defaults`].
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.dependency_manager
            .as_ref()
            .and_then(|dm| dm.tools.clone())
            .unwrap_or_else(ToolDefinition::defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_scope(dir: &Path, content: &str) {
        fs::create_dir_all(dir.join(CONFIG_DIR)).unwrap();
        fs::write(dir.join(CONFIG_DIR).join(SETTING_FILE), content).unwrap();
    }

    #[test]
    fn test_missing_file_is_empty_layer() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_scope(temp.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.activate_all_components_after_add_repo(), None);
        assert_eq!(settings.ambiguous_name_policy(), AmbiguityPolicy::PreferRepo);
        assert_eq!(settings.tools(), ToolDefinition::defaults());
    }

    #[test]
    fn test_load_dependency_manager_table() {
        let temp = TempDir::new().unwrap();
        write_scope(
            temp.path(),
            r#"
[dependency_manager]
activate_all_components_after_add_repo = false
ambiguous_name_policy = "component"
registry = "registry.yml"

[[dependency_manager.tools]]
name = "CocoaPods"
patterns = ["*.podspec"]
"#,
        );

        let settings = Settings::load_scope(temp.path()).unwrap();
        assert_eq!(settings.activate_all_components_after_add_repo(), Some(false));
        assert_eq!(settings.ambiguous_name_policy(), AmbiguityPolicy::PreferComponent);
        assert_eq!(settings.registry(), Some("registry.yml"));
        assert_eq!(settings.tools().len(), 1);
        assert_eq!(settings.tools()[0].patterns, vec!["*.podspec".to_string()]);
    }

    #[test]
    fn test_workspace_overrides_global_field_by_field() {
        let global: Settings = toml::from_str(
            "[dependency_manager]\nactivate_all_components_after_add_repo = true\nregistry = \"global.yml\"\n",
        )
        .unwrap();
        let workspace: Settings =
            toml::from_str("[dependency_manager]\nactivate_all_components_after_add_repo = false\n")
                .unwrap();

        let merged = global.merge(&workspace);
        assert_eq!(merged.activate_all_components_after_add_repo(), Some(false));
        assert_eq!(merged.registry(), Some("global.yml"));

        let merged = global.merge(&Settings::default());
        assert_eq!(merged.activate_all_components_after_add_repo(), Some(true));
    }

    #[test]
    fn test_malformed_settings_fail_to_load() {
        let temp = TempDir::new().unwrap();
        write_scope(temp.path(), "[dependency_manager\n");
        assert!(Settings::load_scope(temp.path()).is_err());
    }
}
