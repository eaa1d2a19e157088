//! Add a repository to the current feature and decide which of its
//! components become active.
//!
//! # Finding the repository
//!
//! `<name>` is looked up, in order, as:
//!
//! 1. a repo of the current feature, or a component of one (re-add);
//! 2. a directory under the workspace root with that name;
//! 3. a directory under the workspace root exposing a component with that name;
//! 4. a dependency found by the search engines, which seeds a new repo.
//!
//! # Choosing the active components
//!
//! The `--activate-all-components` flags win. Otherwise, on the first add
//! only, the repo's own settings and then the workspace settings are
//! consulted for `activate_all_components_after_add_repo`. Failing all
//! of those, everything is activated unless the user asked for specific
//! components (`--component`, or a name that matched a component).
//!
//! ```bash
//! mbox-dp add Foo
//! mbox-dp add Foo --component Bar --tool cocoapods
//! mbox-dp add Bar --no-activate-all-components
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::{debug, info, warn};

use super::common::{CommandContext, CommandExecutor, PostRunHook, save_all_hooks};
use crate::config::AmbiguityPolicy;
use crate::core::{DependencyTool, MboxError};
use crate::git::{GitHistory, GitRepo};
use crate::workspace::{RepoConfig, WorkRepo};

/// Add a repository and activate its components.
#[derive(Debug, Clone, Args)]
pub struct AddCommand {
    /// Repository or component name
    pub name: String,

    /// Only activate these components (repeatable)
    #[arg(long = "component", value_name = "NAME")]
    pub components: Vec<String>,

    /// Only touch these dependency tools (repeatable)
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,

    /// Activate every component of the repo
    #[arg(long, conflicts_with = "no_activate_all_components")]
    pub activate_all_components: bool,

    /// Do not activate every component of the repo
    #[arg(long)]
    pub no_activate_all_components: bool,
}

/// How `<name>` was matched to a repo.
#[derive(Debug)]
struct Discovery {
    repo: RepoConfig,
    is_first_add: bool,
    searched_by_component_name: bool,
}

/// The activation decision for one repo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActivationPlan {
    /// Activate everything for the used tools
    All,
    /// Activate these components for the used tools
    Components(Vec<String>),
    /// Deactivate everything for every available tool
    Nothing,
}

/// Inputs of the activation decision.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActivationInput<'a> {
    pub name: &'a str,
    pub components: &'a [String],
    pub flag: Option<bool>,
    pub is_first_add: bool,
    pub searched_by_component_name: bool,
    pub repo_setting: Option<bool>,
    pub workspace_setting: Option<bool>,
}

impl ActivationInput<'_> {
    pub(crate) fn plan(&self) -> ActivationPlan {
        let targets_components = !self.components.is_empty() || self.searched_by_component_name;
        let from_settings = if self.is_first_add {
            self.repo_setting.or(self.workspace_setting)
        } else {
            None
        };
        let activate_all = self.flag.or(from_settings).unwrap_or(!targets_components);

        if activate_all {
            ActivationPlan::All
        } else if targets_components {
            let list = if self.components.is_empty() {
                vec![self.name.to_string()]
            } else {
                self.components.to_vec()
            };
            ActivationPlan::Components(list)
        } else {
            ActivationPlan::Nothing
        }
    }
}

/// Split `available` into the tools the user asked for and the rest.
/// Requested names no repo tool matches are dropped with a warning.
pub(crate) fn split_tools(
    requested: &[String],
    available: &[DependencyTool],
) -> (Vec<DependencyTool>, Vec<DependencyTool>) {
    if requested.is_empty() {
        return (available.to_vec(), Vec::new());
    }
    let mut used = Vec::new();
    for name in requested {
        let tool = DependencyTool::new(name);
        if available.contains(&tool) {
            if !used.contains(&tool) {
                used.push(tool);
            }
        } else {
            warn!("The repo does not use dependency tool `{name}`, ignoring");
        }
    }
    let unused = available.iter().filter(|t| !used.contains(t)).cloned().collect();
    (used, unused)
}

impl AddCommand {
    fn activate_all_flag(&self) -> Option<bool> {
        if self.activate_all_components {
            Some(true)
        } else if self.no_activate_all_components {
            Some(false)
        } else {
            None
        }
    }

    fn discover(&self, ctx: &mut CommandContext) -> Result<Discovery> {
        let policy = ctx.workspace.settings.ambiguous_name_policy();
        let name = self.name.as_str();

        // 1. already part of the feature
        for (repo, catalog) in ctx.workspace.feature_catalogs()? {
            let matches_repo = repo.is_named(name);
            let matches_component = catalog.has_component(name);
            if matches_repo || matches_component {
                debug!("[{}] Re-adding repo of the current feature", repo.name);
                return Ok(Discovery {
                    searched_by_component_name: searched_by_component(
                        policy,
                        matches_repo,
                        matches_component,
                    ),
                    repo,
                    is_first_add: false,
                });
            }
        }

        let candidates = ctx.workspace.local_repo_candidates()?;

        // 2. a working copy named after the repo
        if let Some((dir, path)) = candidates.iter().find(|(dir, _)| dir.eq_ignore_ascii_case(name)) {
            let catalog = WorkRepo::resolve(dir, path, &ctx.workspace.registry);
            let mut repo = RepoConfig::new(dir.clone());
            repo.url = GitRepo::open(path).and_then(|git| git.remote_url().ok());
            return Ok(Discovery {
                searched_by_component_name: searched_by_component(
                    policy,
                    true,
                    catalog.has_component(name),
                ),
                repo,
                is_first_add: true,
            });
        }

        // 3. a working copy exposing the component
        for (dir, path) in &candidates {
            let catalog = WorkRepo::resolve(dir, path, &ctx.workspace.registry);
            if catalog.has_component(name) {
                debug!("[{dir}] Found component `{name}` in local working copy");
                let mut repo = RepoConfig::new(dir.clone());
                repo.url = GitRepo::open(path).and_then(|git| git.remote_url().ok());
                return Ok(Discovery {
                    repo,
                    is_first_add: true,
                    searched_by_component_name: true,
                });
            }
        }

        // 4. a dependency known to the search engines
        let found = ctx
            .resolver()?
            .search_dependency(&[name.to_string()], None, None)
            .ok_or_else(|| MboxError::RepoNotFound {
                name: name.to_string(),
            })?;
        info!("[{name}] Creating repo from dependency: {found}");
        Ok(Discovery {
            repo: RepoConfig::from_dependency(name, &found),
            is_first_add: true,
            searched_by_component_name: false,
        })
    }

    /// Pick the checkout for a new repo from the requested components'
    /// dependency records.
    fn fetch_commit_to_checkout(&self, ctx: &mut CommandContext, repo: &mut RepoConfig) -> Result<()> {
        let working_path = repo.working_path(&ctx.workspace.root);
        let git = GitRepo::open(&working_path);
        let history = git.as_ref().map(|g| g as &dyn GitHistory);
        let Some(found) = ctx
            .resolver()?
            .search_dependency(&self.components, Some(&*repo), history)
        else {
            return Ok(());
        };

        if found.git.is_some() {
            repo.url = found.git.clone();
        }
        if found.path.is_some() && repo.path.is_none() && !working_path.is_dir() {
            repo.path = found.path.clone();
        }
        if let Some(pointer) = found.git_pointer() {
            info!("[{}] Checkout {pointer}", repo.name);
            repo.base_git_pointer = Some(pointer);
        }
        Ok(())
    }

    /// Drop user overrides of packages the repo now provides.
    fn clean_local_dependencies(ctx: &mut CommandContext, catalog: &WorkRepo) {
        for package in catalog.package_names() {
            if ctx.workspace.dependencies.find_any(std::slice::from_ref(&package)).is_empty() {
                continue;
            }
            info!("[{}] Remove dependency override `{package}`", catalog.name);
            ctx.workspace
                .dependencies
                .dependencies
                .retain(|dp| !dp.name().is_some_and(|n| n.eq_ignore_ascii_case(&package)));
        }
    }
}

fn searched_by_component(policy: AmbiguityPolicy, matches_repo: bool, matches_component: bool) -> bool {
    match policy {
        AmbiguityPolicy::PreferRepo => matches_component && !matches_repo,
        AmbiguityPolicy::PreferComponent => matches_component,
    }
}

impl CommandExecutor for AddCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        save_all_hooks()
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        let Discovery {
            mut repo,
            is_first_add,
            searched_by_component_name,
        } = self.discover(ctx)?;

        let mut repo_setting = None;
        if is_first_add {
            if !self.components.is_empty() {
                self.fetch_commit_to_checkout(ctx, &mut repo)?;
            }
            repo_setting = ctx.workspace.repo_settings(&repo)?.activate_all_components_after_add_repo();
            ctx.workspace.invalidate_catalog(&repo.name);
            ctx.workspace.current_feature_mut()?.repos.push(repo.clone());
        }

        let catalog = ctx.workspace.catalog(&repo.name)?.clone();
        Self::clean_local_dependencies(ctx, &catalog);
        self.apply(ctx, &repo.name, is_first_add, searched_by_component_name, repo_setting)?;

        let verb = if is_first_add { "Added" } else { "Updated" };
        println!("{}", format!("{verb} repo `{}`", repo.name).green());
        print_activation(ctx, &repo.name)
    }
}

impl AddCommand {
    fn apply(
        &self,
        ctx: &mut CommandContext,
        repo_name: &str,
        is_first_add: bool,
        searched_by_component_name: bool,
        repo_setting: Option<bool>,
    ) -> Result<()> {
        let workspace_setting = ctx.workspace.settings.activate_all_components_after_add_repo();
        let plan = ActivationInput {
            name: &self.name,
            components: &self.components,
            flag: self.activate_all_flag(),
            is_first_add,
            searched_by_component_name,
            repo_setting,
            workspace_setting,
        }
        .plan();
        debug!("[{repo_name}] Activation plan: {plan:?}");

        let (repo, catalog) = ctx.workspace.repo_with_catalog(repo_name)?;
        let available = catalog.tools();
        let (used, unused) = split_tools(&self.tools, &available);

        match plan {
            ActivationPlan::All => {
                repo.activate_all(&used);
                if is_first_add {
                    repo.deactivate_all(&unused);
                }
            }
            ActivationPlan::Components(names) => {
                for name in &names {
                    if !used.iter().any(|tool| catalog.fetch_component(name, tool).is_some()) {
                        return Err(MboxError::ComponentNotFound {
                            name: name.clone(),
                            repo: Some(repo.name.clone()),
                        }
                        .into());
                    }
                }
                for tool in &used {
                    let activated = repo.activate_components(&names, tool, is_first_add, catalog);
                    if !activated && is_first_add {
                        repo.deactivate_all(std::slice::from_ref(tool));
                    }
                }
                if is_first_add {
                    repo.deactivate_all(&unused);
                }
            }
            ActivationPlan::Nothing => repo.deactivate_all(&available),
        }
        Ok(())
    }
}

/// Print every component of a repo with its state.
pub(crate) fn print_activation(ctx: &mut CommandContext, repo_name: &str) -> Result<()> {
    let (repo, catalog) = ctx.workspace.repo_with_catalog(repo_name)?;
    for (tool, components) in catalog.components_by_tool() {
        println!("  {}", tool.to_string().bold());
        for component in components {
            if repo.is_active(component) {
                println!("    {} {}", "+".green().bold(), component.name);
            } else {
                println!("    {} {}", "-".dimmed(), component.name.strikethrough().dimmed());
            }
        }
    }
    Ok(())
}
