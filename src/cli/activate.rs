//! `activate` / `deactivate`: toggle components of feature repos.
//!
//! ```bash
//! mbox-dp activate Foo/Bar
//! mbox-dp deactivate Bar --tool cocoapods
//! mbox-dp activate --all
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, CommandExecutor, PostRunHook, save_all_hooks};
use crate::core::{DependencyTool, MboxError};
use crate::models::ActivationTargetArgs;

/// Activate components.
#[derive(Debug, Clone, Args)]
pub struct ActivateCommand {
    #[command(flatten)]
    pub target: ActivationTargetArgs,
}

/// Deactivate components.
#[derive(Debug, Clone, Args)]
pub struct DeactivateCommand {
    #[command(flatten)]
    pub target: ActivationTargetArgs,
}

/// One resolved unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    /// Every component of a repo for one tool
    Repo { repo: String, tool: DependencyTool },
    /// One component
    Component {
        repo: String,
        tool: DependencyTool,
        name: String,
    },
}

impl Target {
    fn repo(&self) -> &str {
        match self {
            Self::Repo { repo, .. } | Self::Component { repo, .. } => repo,
        }
    }

    fn tool(&self) -> &DependencyTool {
        match self {
            Self::Repo { tool, .. } | Self::Component { tool, .. } => tool,
        }
    }
}

/// Resolve user-supplied names to targets for `tools`.
pub(crate) fn resolve_targets(
    ctx: &mut CommandContext,
    names: &[String],
    tools: &[DependencyTool],
) -> Result<Vec<Target>> {
    let catalogs = ctx.workspace.feature_catalogs()?;
    let whole_repo = |repo: &str| -> Vec<Target> {
        tools
            .iter()
            .map(|tool| Target::Repo {
                repo: repo.to_string(),
                tool: tool.clone(),
            })
            .collect()
    };

    let mut targets = Vec::new();
    for name in names {
        if name == "*" {
            for (repo, _) in &catalogs {
                targets.extend(whole_repo(&repo.name));
            }
            continue;
        }

        let (head, rest) = match name.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name.as_str(), None),
        };

        if let Some((repo, catalog)) = catalogs.iter().find(|(repo, _)| repo.is_named(head)) {
            match rest {
                Some("*") => targets.extend(whole_repo(&repo.name)),
                Some(component) if !component.is_empty() => {
                    let found: Vec<Target> = tools
                        .iter()
                        .filter_map(|tool| catalog.fetch_component(component, tool))
                        .map(|c| Target::Component {
                            repo: repo.name.clone(),
                            tool: c.tool.clone(),
                            name: c.name.clone(),
                        })
                        .collect();
                    if found.is_empty() {
                        return Err(MboxError::ComponentNotFound {
                            name: component.to_string(),
                            repo: Some(repo.name.clone()),
                        }
                        .into());
                    }
                    targets.extend(found);
                }
                _ => {
                    // the repo-named component if there is one, else the whole repo
                    for tool in tools {
                        match catalog.fetch_component(head, tool) {
                            Some(c) => targets.push(Target::Component {
                                repo: repo.name.clone(),
                                tool: tool.clone(),
                                name: c.name.clone(),
                            }),
                            None => targets.push(Target::Repo {
                                repo: repo.name.clone(),
                                tool: tool.clone(),
                            }),
                        }
                    }
                }
            }
            continue;
        }

        let found: Vec<Target> = catalogs
            .iter()
            .flat_map(|(repo, catalog)| {
                tools.iter().filter_map(move |tool| {
                    catalog.fetch_component(name, tool).map(|c| Target::Component {
                        repo: repo.name.clone(),
                        tool: tool.clone(),
                        name: c.name.clone(),
                    })
                })
            })
            .collect();
        if found.is_empty() {
            return Err(MboxError::ComponentNotFound {
                name: name.clone(),
                repo: None,
            }
            .into());
        }
        targets.extend(found);
    }

    Ok(dedup_targets(targets))
}

/// Drop duplicates and component targets covered by a whole-repo target.
pub(crate) fn dedup_targets(targets: Vec<Target>) -> Vec<Target> {
    let wholes: Vec<(String, DependencyTool)> = targets
        .iter()
        .filter_map(|t| match t {
            Target::Repo { repo, tool } => Some((repo.to_lowercase(), tool.clone())),
            Target::Component { .. } => None,
        })
        .collect();

    let mut unique: Vec<Target> = Vec::with_capacity(targets.len());
    for target in targets {
        let covered = matches!(target, Target::Component { .. })
            && wholes
                .iter()
                .any(|(repo, tool)| *repo == target.repo().to_lowercase() && tool == target.tool());
        if !covered && !unique.contains(&target) {
            unique.push(target);
        }
    }
    unique
}

fn check_arguments(target: &ActivationTargetArgs) -> Result<(), MboxError> {
    if target.all && !target.names.is_empty() {
        return Err(MboxError::MissingArgument {
            message: "Component names could not be used together with `--all`".to_string(),
        });
    }
    if !target.all && target.names.is_empty() {
        return Err(MboxError::MissingArgument {
            message: "Require component names, or you can use `--all` to change every component"
                .to_string(),
        });
    }
    Ok(())
}

fn toggle(ctx: &mut CommandContext, target: &ActivationTargetArgs, activate: bool) -> Result<()> {
    check_arguments(target)?;
    let tools = ctx.requested_tools(&target.tools.tools)?;

    let targets = if target.all {
        let repos: Vec<String> =
            ctx.workspace.current_feature()?.repos.iter().map(|r| r.name.clone()).collect();
        let mut all = Vec::new();
        for repo in repos {
            for tool in &tools {
                all.push(Target::Repo {
                    repo: repo.clone(),
                    tool: tool.clone(),
                });
            }
        }
        all
    } else {
        resolve_targets(ctx, &target.names, &tools)?
    };

    let verb = if activate { "Activated" } else { "Deactivated" };
    for target in &targets {
        let (repo, catalog) = ctx.workspace.repo_with_catalog(target.repo())?;
        match target {
            Target::Repo { tool, .. } => {
                if activate {
                    repo.activate_all(std::slice::from_ref(tool));
                } else {
                    repo.deactivate_all(std::slice::from_ref(tool));
                }
                println!("{} all {} components of `{}`", verb.green(), tool, repo.name);
            }
            Target::Component { tool, name, .. } => {
                let Some(component) = catalog.fetch_component(name, tool).cloned() else {
                    continue;
                };
                if activate {
                    repo.activate_component(&component, catalog);
                } else {
                    repo.deactivate_component(&component, catalog);
                }
                println!("{} {} component `{}/{}`", verb.green(), tool, repo.name, component.name);
            }
        }
    }
    Ok(())
}

impl CommandExecutor for ActivateCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        save_all_hooks()
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        toggle(ctx, &self.target, true)
    }
}

impl CommandExecutor for DeactivateCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        save_all_hooks()
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        toggle(ctx, &self.target, false)
    }
}
