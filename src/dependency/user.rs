//! User dependency overrides (`MBox.dependencies.yml`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::Dependency;
use crate::core::DependencyTool;
use crate::utils::fs::{read_yaml_file, write_yaml_file};

/// A [`Dependency`] plus the tools it applies to.
///
/// `tools: None` means the override applies to every tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDependency {
    #[serde(flatten)]
    pub dependency: Dependency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<DependencyTool>>,
}

impl UserDependency {
    /// Create an empty override for `name`, scoped to `tool` when given.
    pub fn new(name: impl Into<String>, tool: Option<&DependencyTool>) -> Self {
        Self {
            dependency: Dependency::named(name),
            tools: tool.map(|t| vec![t.clone()]),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.dependency.name.as_deref()
    }

    /// Whether this override applies to `tool`. `None` asks about the
    /// unscoped view and matches every record.
    #[must_use]
    pub fn applies_to(&self, tool: Option<&DependencyTool>) -> bool {
        match (tool, &self.tools) {
            (Some(tool), Some(tools)) => tools.contains(tool),
            _ => true,
        }
    }

    /// Drop `tool` from the scope. Returns `true` when the record no longer
    /// covers any tool and should be discarded. `None` releases every tool.
    fn release(&mut self, tool: Option<&DependencyTool>) -> bool {
        let Some(tool) = tool else {
            return true;
        };
        if let Some(tools) = self.tools.as_mut() {
            tools.retain(|t| t != tool);
        }
        self.tools.as_ref().is_none_or(Vec::is_empty)
    }
}

impl fmt::Display for UserDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name().unwrap_or("<unnamed>"), self.dependency)?;
        if let Some(tools) = &self.tools {
            let scope: Vec<String> = tools.iter().map(|t| format!("`{t}`")).collect();
            write!(f, ", by {}", scope.join(", "))?;
        }
        Ok(())
    }
}

/// The ordered collection of user overrides owned by a feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDependencyFile {
    path: PathBuf,
    pub dependencies: Vec<UserDependency>,
}

impl UserDependencyFile {
    /// Create an in-memory file that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>, dependencies: Vec<UserDependency>) -> Self {
        Self {
            path: path.into(),
            dependencies,
        }
    }

    /// Load the YAML array at `path`. A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let dependencies = if path.exists() {
            read_yaml_file::<Option<Vec<UserDependency>>>(path)?.unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(Self::new(path, dependencies))
    }

    pub fn save(&self) -> Result<()> {
        write_yaml_file(&self.path, &self.dependencies)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove every record covering `tool` (`None` removes everything).
    /// Records scoped to several tools only lose `tool` from their scope.
    pub fn remove_all(&mut self, tool: Option<&DependencyTool>) {
        self.dependencies.retain_mut(|dp| !dp.release(tool));
    }

    /// Remove `name` for `tool`, with the same scoping rules as [`remove_all`](Self::remove_all).
    pub fn remove(&mut self, name: &str, tool: Option<&DependencyTool>) {
        self.dependencies
            .retain_mut(|dp| !(dp.name() == Some(name) && dp.release(tool)));
    }

    /// Append `dependency`, replacing any record with the same name inside
    /// its tool scope.
    pub fn add(&mut self, dependency: UserDependency) {
        if let Some(name) = dependency.name().map(str::to_string) {
            match &dependency.tools {
                Some(tools) => {
                    for tool in tools {
                        self.remove(&name, Some(tool));
                    }
                }
                None => self.remove(&name, None),
            }
        }
        self.dependencies.push(dependency);
    }

    /// The record for `name` that applies to `tool`.
    #[must_use]
    pub fn dependency(&self, name: &str, tool: Option<&DependencyTool>) -> Option<&UserDependency> {
        self.dependencies
            .iter()
            .find(|dp| dp.name() == Some(name) && dp.applies_to(tool))
    }

    /// The record for `name` and `tool`, created (scoped to `tool`) when missing.
    pub fn dependency_or_insert(
        &mut self,
        name: &str,
        tool: Option<&DependencyTool>,
    ) -> &mut UserDependency {
        let index = match self
            .dependencies
            .iter()
            .position(|dp| dp.name() == Some(name) && dp.applies_to(tool))
        {
            Some(index) => index,
            None => {
                self.add(UserDependency::new(name, tool));
                self.dependencies.len() - 1
            }
        };
        &mut self.dependencies[index]
    }

    /// Records applying to `tool`, in file order.
    pub fn dependencies_for<'a>(
        &'a self,
        tool: Option<&'a DependencyTool>,
    ) -> impl Iterator<Item = &'a UserDependency> + 'a {
        self.dependencies.iter().filter(move |dp| dp.applies_to(tool))
    }

    /// Case-insensitive lookup by any of `names`, used by the search engine.
    #[must_use]
    pub fn find_any(&self, names: &[String]) -> Vec<&UserDependency> {
        self.dependencies
            .iter()
            .filter(|dp| {
                dp.name()
                    .is_some_and(|n| names.iter().any(|name| name.eq_ignore_ascii_case(n)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pods() -> DependencyTool {
        DependencyTool::new("cocoapods")
    }

    fn bundler() -> DependencyTool {
        DependencyTool::new("bundler")
    }

    fn file_with(deps: Vec<UserDependency>) -> UserDependencyFile {
        UserDependencyFile::new("/tmp/unused.yml", deps)
    }

    #[test]
    fn test_yaml_round_trip_preserves_fields_and_scope() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("MBox.dependencies.yml");

        let mut scoped = UserDependency::new("Baz", Some(&pods()));
        scoped.dependency.git = Some("https://example.com/baz.git".to_string());
        scoped.dependency.tag = Some("1.2.0".to_string());
        let mut global = UserDependency::new("Qux", None);
        global.dependency.version = Some("2.0".to_string());
        global.dependency.binary = Some(true);

        let file = UserDependencyFile::new(&path, vec![scoped, global]);
        file.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("tools:"));
        assert!(content.contains("- cocoapods"));

        let loaded = UserDependencyFile::load(&path).unwrap();
        assert_eq!(loaded.dependencies, file.dependencies);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let loaded = UserDependencyFile::load(&temp.path().join("none.yml")).unwrap();
        assert!(loaded.dependencies.is_empty());
    }

    #[test]
    fn test_remove_unscoped_record_removes_entirely() {
        let mut file = file_with(vec![UserDependency::new("Baz", None)]);
        file.remove("Baz", Some(&pods()));
        assert!(file.dependencies.is_empty());
    }

    #[test]
    fn test_remove_multi_tool_record_is_partial() {
        let mut dep = UserDependency::new("Baz", None);
        dep.tools = Some(vec![pods(), bundler()]);
        let mut file = file_with(vec![dep]);

        file.remove("Baz", Some(&pods()));
        assert_eq!(file.dependencies.len(), 1);
        assert_eq!(file.dependencies[0].tools, Some(vec![bundler()]));

        file.remove("Baz", Some(&bundler()));
        assert!(file.dependencies.is_empty());
    }

    #[test]
    fn test_add_replaces_within_tool_scope() {
        let mut old = UserDependency::new("Baz", None);
        old.tools = Some(vec![pods(), bundler()]);
        let mut file = file_with(vec![old]);

        let mut new = UserDependency::new("Baz", Some(&pods()));
        new.dependency.version = Some("3.0".to_string());
        file.add(new);

        assert_eq!(file.dependencies.len(), 2);
        assert_eq!(file.dependencies[0].tools, Some(vec![bundler()]));
        assert_eq!(
            file.dependency("Baz", Some(&pods())).unwrap().dependency.version.as_deref(),
            Some("3.0")
        );
    }

    #[test]
    fn test_dependency_or_insert_scopes_new_record() {
        let mut file = file_with(Vec::new());
        file.dependency_or_insert("Baz", Some(&pods())).dependency.version = Some("1.0".to_string());

        assert_eq!(file.dependencies.len(), 1);
        assert_eq!(file.dependencies[0].tools, Some(vec![pods()]));
        assert!(file.dependency("Baz", Some(&bundler())).is_none());

        // existing unscoped record is edited in place
        let mut file = file_with(vec![UserDependency::new("Qux", None)]);
        file.dependency_or_insert("Qux", Some(&pods())).dependency.binary = Some(true);
        assert_eq!(file.dependencies.len(), 1);
        assert_eq!(file.dependencies[0].tools, None);
    }

    #[test]
    fn test_remove_all_respects_tool_scope() {
        let mut file = file_with(vec![
            UserDependency::new("A", Some(&pods())),
            UserDependency::new("B", Some(&bundler())),
        ]);
        file.remove_all(Some(&pods()));
        assert_eq!(file.dependencies.len(), 1);
        assert_eq!(file.dependencies[0].name(), Some("B"));

        file.remove_all(None);
        assert!(file.dependencies.is_empty());
    }

    #[test]
    fn test_find_any_is_case_insensitive() {
        let file = file_with(vec![UserDependency::new("AFNetworking", None)]);
        assert_eq!(file.find_any(&["afnetworking".to_string()]).len(), 1);
        assert!(file.find_any(&["Other".to_string()]).is_empty());
    }

    #[test]
    fn test_display_lists_tool_scope() {
        let mut dep = UserDependency::new("Baz", Some(&pods()));
        dep.dependency.version = Some("1.0".to_string());
        assert_eq!(dep.to_string(), "Baz: 1.0, by `cocoapods`");
    }
}
