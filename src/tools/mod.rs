//! Dependency tool registry and component providers.
//!
//! Each dependency tool knows how to list the components a repository exposes
//! for it. That capability is the [`ComponentProvider`] trait; the registry
//! owns one provider per tool and is the universe of valid tool names.
//!
//! The registry is built once per process from the merged settings and passed
//! down by reference. The built-in provider is [`PatternTool`], which treats
//! every manifest file matching its glob patterns as a component.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Settings, ToolDefinition};
use crate::core::{DependencyTool, MboxError};
use crate::utils::fs::read_json_file;
use crate::workspace::Component;

/// Lists the components one dependency tool sees in a repository.
pub trait ComponentProvider {
    /// The tool this provider answers for.
    fn tool(&self) -> &DependencyTool;

    /// Components exposed by the working copy at `repo_path`.
    fn resolve_components(&self, repo_name: &str, repo_path: &Path) -> Result<Vec<Component>>;
}

/// The set of registered dependency tools.
pub struct ToolRegistry {
    providers: Vec<Box<dyn ComponentProvider>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.all_tools()).finish()
    }
}

impl ToolRegistry {
    /// Build a registry from providers. A tool registered twice keeps its
    /// first provider.
    pub fn new(providers: Vec<Box<dyn ComponentProvider>>) -> Self {
        let mut unique: Vec<Box<dyn ComponentProvider>> = Vec::with_capacity(providers.len());
        for provider in providers {
            if unique.iter().any(|p| p.tool() == provider.tool()) {
                warn!("Dependency tool `{}` is registered twice, ignoring", provider.tool());
                continue;
            }
            unique.push(provider);
        }
        Self { providers: unique }
    }

    /// Build a [`PatternTool`] per configured tool.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let providers = settings
            .tools()
            .iter()
            .map(|definition| {
                PatternTool::from_definition(definition)
                    .map(|tool| Box::new(tool) as Box<dyn ComponentProvider>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    /// Every registered tool, in registration order.
    #[must_use]
    pub fn all_tools(&self) -> Vec<DependencyTool> {
        self.providers.iter().map(|p| p.tool().clone()).collect()
    }

    /// Look up a tool by name, case-insensitively.
    pub fn tool(&self, name: &str) -> Result<DependencyTool, MboxError> {
        self.providers
            .iter()
            .map(|p| p.tool())
            .find(|tool| tool.is_named(name))
            .cloned()
            .ok_or_else(|| MboxError::UnknownTool {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn contains(&self, tool: &DependencyTool) -> bool {
        self.providers.iter().any(|p| p.tool() == tool)
    }

    #[must_use]
    pub fn providers(&self) -> &[Box<dyn ComponentProvider>] {
        &self.providers
    }
}

/// A provider matching manifest file names against glob patterns.
///
/// `Bar.podspec` under pattern `*.podspec` yields a component `Bar` whose
/// path is the manifest's directory. Hidden directories are not searched.
#[derive(Debug, Clone)]
pub struct PatternTool {
    tool: DependencyTool,
    patterns: Vec<(glob::Pattern, Option<String>)>,
}

impl PatternTool {
    pub fn new(tool: DependencyTool, patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let pattern = glob::Pattern::new(raw)
                    .with_context(|| format!("Invalid component pattern `{raw}` for {tool}"))?;
                // `*.podspec.json` strips `.podspec.json`; anything fancier falls back to the file stem
                let suffix = raw
                    .strip_prefix('*')
                    .filter(|rest| !rest.contains(['*', '?', '[']))
                    .map(str::to_string);
                Ok((pattern, suffix))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tool, patterns })
    }

    pub fn from_definition(definition: &ToolDefinition) -> Result<Self> {
        Self::new(DependencyTool::new(&definition.name), &definition.patterns)
    }

    fn component_name(&self, file_name: &str) -> Option<String> {
        let (_, suffix) = self.patterns.iter().find(|(p, _)| p.matches(file_name))?;
        let name = match suffix {
            Some(suffix) => file_name.strip_suffix(suffix.as_str())?,
            None => Path::new(file_name).file_stem()?.to_str()?,
        };
        (!name.is_empty()).then(|| name.to_string())
    }
}

impl ComponentProvider for PatternTool {
    fn tool(&self) -> &DependencyTool {
        &self.tool
    }

    fn resolve_components(&self, repo_name: &str, repo_path: &Path) -> Result<Vec<Component>> {
        if !repo_path.is_dir() {
            warn!("[{repo_name}] Working copy is missing: {}", repo_path.display());
            return Ok(Vec::new());
        }

        let mut components = Vec::new();
        let walker = WalkDir::new(repo_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_str().is_some_and(|n| n.starts_with('.'))
            });

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to scan {}", repo_path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().and_then(|f| self.component_name(f))
            else {
                continue;
            };
            let spec_path = entry
                .path()
                .strip_prefix(repo_path)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            debug!("[{repo_name}] Found {} component `{name}` at {spec_path}", self.tool);
            let mut component = Component::new(name, self.tool.clone(), repo_name, repo_path)
                .with_spec_path(&spec_path, repo_path);
            if let Some(spec) = read_json_manifest(entry.path()) {
                component = component.with_spec(spec);
            }
            components.push(component);
        }
        Ok(components)
    }
}

/// The payload of a JSON manifest (`Bar.podspec.json`); other formats stay opaque.
fn read_json_manifest(path: &Path) -> Option<serde_json::Value> {
    if path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }
    match read_json_file(path) {
        Ok(spec) => Some(spec),
        Err(e) => {
            warn!("Ignoring unreadable manifest {}: {e:#}", path.display());
            None
        }
    }
}
