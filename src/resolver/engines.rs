//! Built-in search engines.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SearchEngine;
use crate::constants::{REGISTRY_ENGINE_PRIORITY, USER_DEPENDENCY_ENGINE_PRIORITY};
use crate::dependency::{Dependency, UserDependency};
use crate::git::git_urls_match;
use crate::utils::fs::read_yaml_file;

/// Searches the current feature's user dependency overrides.
///
/// Holds a snapshot taken when the engine is built; edits made afterwards
/// are not visible to it.
#[derive(Debug, Clone, Default)]
pub struct UserDependencyEngine {
    dependencies: Vec<UserDependency>,
}

impl UserDependencyEngine {
    pub fn new(dependencies: Vec<UserDependency>) -> Self {
        Self { dependencies }
    }
}

impl SearchEngine for UserDependencyEngine {
    fn name(&self) -> &str {
        "user dependencies"
    }

    fn priority(&self) -> i32 {
        USER_DEPENDENCY_ENGINE_PRIORITY
    }

    fn search_dependencies(&self, names: &[String]) -> Result<Vec<Dependency>> {
        Ok(self
            .dependencies
            .iter()
            .filter(|dp| {
                dp.name()
                    .is_some_and(|n| names.iter().any(|name| name.eq_ignore_ascii_case(n)))
            })
            .map(|dp| dp.dependency.clone())
            .collect())
    }

    fn resolve_dependency(
        &self,
        _name: &str,
        _version: Option<&str>,
        _url: Option<&str>,
    ) -> Result<Option<Dependency>> {
        Ok(None)
    }
}

/// Resolves releases from a YAML index file.
///
/// The index is a list of releases, each a dependency record:
///
/// ```yaml
/// - name: Baz
///   version: 2.0.0
///   git: https://github.com/example/Baz.git
///   tag: 2.0.0
///   date: 2024-03-01T00:00:00Z
///   homepage: https://example.com/baz
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryEngine {
    path: PathBuf,
    releases: Vec<Dependency>,
}

impl RegistryEngine {
    pub fn new(path: impl Into<PathBuf>, releases: Vec<Dependency>) -> Self {
        Self {
            path: path.into(),
            releases,
        }
    }

    /// Load the index at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let releases: Option<Vec<Dependency>> = read_yaml_file(path)
            .with_context(|| format!("Failed to load registry index {}", path.display()))?;
        let releases = releases.unwrap_or_default();
        debug!("Loaded {} release(s) from {}", releases.len(), path.display());
        Ok(Self::new(path, releases))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn find_release(&self, name: &str, version: Option<&str>, url: Option<&str>) -> Option<&Dependency> {
        self.releases
            .iter()
            .filter(|r| r.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .filter(|r| version.is_none_or(|v| r.version.as_deref() == Some(v)))
            .filter(|r| match (url, r.git.as_deref()) {
                (Some(url), Some(git)) => git_urls_match(url, git),
                _ => true,
            })
            // undated releases rank below dated ones; ties keep the later entry
            .max_by_key(|r| r.date)
    }
}

impl SearchEngine for RegistryEngine {
    fn name(&self) -> &str {
        "registry"
    }

    fn priority(&self) -> i32 {
        REGISTRY_ENGINE_PRIORITY
    }

    fn search_dependencies(&self, _names: &[String]) -> Result<Vec<Dependency>> {
        Ok(Vec::new())
    }

    fn resolve_dependency(
        &self,
        name: &str,
        version: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<Dependency>> {
        Ok(self.find_release(name, version, url).cloned())
    }

    fn release_date(&self, name: &str, version: Option<&str>) -> Result<Option<DateTime<Utc>>> {
        Ok(self.find_release(name, version, None).and_then(|r| r.date))
    }
}
