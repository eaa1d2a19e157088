//! Command context and the post-run hook pipeline shared by all commands.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::core::DependencyTool;
use crate::lockfile::save_changed_dependencies_lock;
use crate::resolver::{DependencyResolver, RegistryEngine, SearchEngine, UserDependencyEngine};
use crate::utils::fs::expand_path;
use crate::workspace::Workspace;

/// A command running against a loaded workspace.
///
/// `execute` does the work in memory; the hooks returned by
/// [`post_run_hooks`](Self::post_run_hooks) then persist it, in order.
pub trait CommandExecutor: Sized {
    fn execute(self, ctx: &mut CommandContext) -> Result<()>;

    /// Hooks to run after a successful `execute`. Read-only commands keep
    /// the default empty list.
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        Vec::new()
    }

    /// Execute, then run the post-run hooks.
    fn run(self, ctx: &mut CommandContext) -> Result<()> {
        let hooks = self.post_run_hooks();
        self.execute(ctx)?;
        ctx.run_hooks(&hooks)
    }
}

/// A step run after a mutating command.
pub trait PostRunHook {
    fn name(&self) -> &'static str;
    fn run(&self, workspace: &mut Workspace) -> Result<()>;
}

/// Writes `.mbox/config.json`.
pub struct SaveConfig;

impl PostRunHook for SaveConfig {
    fn name(&self) -> &'static str {
        "save config"
    }

    fn run(&self, workspace: &mut Workspace) -> Result<()> {
        workspace.save_config()
    }
}

/// Writes `MBox.dependencies.yml` when it changed.
pub struct SaveDependencies;

impl PostRunHook for SaveDependencies {
    fn name(&self) -> &'static str {
        "save dependencies"
    }

    fn run(&self, workspace: &mut Workspace) -> Result<()> {
        workspace.save_dependencies()
    }
}

/// Recomputes and writes `.mbox/dependencies.lock`.
pub struct SaveChangedDependenciesLock;

impl PostRunHook for SaveChangedDependenciesLock {
    fn name(&self) -> &'static str {
        "save changed dependencies lock"
    }

    fn run(&self, workspace: &mut Workspace) -> Result<()> {
        save_changed_dependencies_lock(workspace).map(|_| ())
    }
}

/// Every persistence hook, in the order mutating commands run them.
#[must_use]
pub fn save_all_hooks() -> Vec<Box<dyn PostRunHook>> {
    vec![
        Box::new(SaveConfig),
        Box::new(SaveDependencies),
        Box::new(SaveChangedDependenciesLock),
    ]
}

/// State shared by the commands of one invocation.
#[derive(Debug)]
pub struct CommandContext {
    pub workspace: Workspace,
    resolver: Option<DependencyResolver>,
}

impl CommandContext {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            resolver: None,
        }
    }

    /// Load global settings and the workspace enclosing `start`.
    pub fn discover(start: &Path, config_path: Option<&Path>) -> Result<Self> {
        let global_settings = Settings::load_global(config_path)?;
        let workspace = Workspace::discover(start, &global_settings)?;
        Ok(Self::new(workspace))
    }

    /// The dependency resolver, built on first use.
    pub fn resolver(&mut self) -> Result<&DependencyResolver> {
        if self.resolver.is_none() {
            self.resolver = Some(build_resolver(&self.workspace)?);
        }
        self.resolver
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("dependency resolver is unavailable"))
    }

    /// Registry tools for `names`; every tool when `names` is empty.
    pub fn requested_tools(&self, names: &[String]) -> Result<Vec<DependencyTool>> {
        if names.is_empty() {
            return Ok(self.workspace.registry.all_tools());
        }
        let mut tools = Vec::with_capacity(names.len());
        for name in names {
            let tool = self.workspace.registry.tool(name)?;
            if !tools.contains(&tool) {
                tools.push(tool);
            }
        }
        Ok(tools)
    }

    pub fn run_hooks(&mut self, hooks: &[Box<dyn PostRunHook>]) -> Result<()> {
        for hook in hooks {
            debug!("Running post-run hook: {}", hook.name());
            hook.run(&mut self.workspace)?;
        }
        Ok(())
    }
}

/// Build the engines for `workspace`: its user dependencies, plus the
/// registry index when one is configured.
pub fn build_resolver(workspace: &Workspace) -> Result<DependencyResolver> {
    let mut engines: Vec<Box<dyn SearchEngine>> = vec![Box::new(UserDependencyEngine::new(
        workspace.dependencies.dependencies.clone(),
    ))];

    if let Some(registry) = workspace.settings.registry() {
        let path = expand_path(registry, &workspace.root);
        if path.is_file() {
            engines.push(Box::new(RegistryEngine::load(&path)?));
        } else {
            warn!("Registry index {} does not exist, skipping", path.display());
        }
    }
    Ok(DependencyResolver::new(&workspace.root, engines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::UserDependency;
    use crate::workspace::RepoConfig;
    use tempfile::TempDir;

    fn context() -> (TempDir, CommandContext) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        Workspace::init(&root).unwrap();
        let workspace = Workspace::load(&root, &Settings::default()).unwrap();
        (temp, CommandContext::new(workspace))
    }

    #[test]
    fn test_requested_tools_validates_names() {
        let (_temp, ctx) = context();
        assert_eq!(ctx.requested_tools(&[]).unwrap().len(), 2);
        let tools = ctx
            .requested_tools(&["CocoaPods".to_string(), "cocoapods".to_string()])
            .unwrap();
        assert_eq!(tools, vec![DependencyTool::new("cocoapods")]);
        assert!(ctx.requested_tools(&["gradle".to_string()]).is_err());
    }

    #[test]
    fn test_hooks_persist_in_order() {
        let (_temp, mut ctx) = context();
        ctx.workspace.current_feature_mut().unwrap().repos.push(RepoConfig::new("Foo"));
        ctx.workspace.dependencies.add(UserDependency::new("Baz", None));
        ctx.run_hooks(&save_all_hooks()).unwrap();

        let reloaded = Workspace::load(&ctx.workspace.root, &Settings::default()).unwrap();
        assert_eq!(reloaded.current_feature().unwrap().repos.len(), 1);
        assert_eq!(reloaded.dependencies.dependencies.len(), 1);
        assert!(ctx.workspace.lock_path().exists());
    }

    #[test]
    fn test_resolver_searches_user_dependencies() {
        let (_temp, mut ctx) = context();
        let mut baz = UserDependency::new("Baz", None);
        baz.dependency.branch = Some("develop".to_string());
        ctx.workspace.dependencies.add(baz);

        let found = ctx
            .resolver()
            .unwrap()
            .search_dependency(&["baz".to_string()], None, None)
            .unwrap();
        assert_eq!(found.branch.as_deref(), Some("develop"));
    }
}
