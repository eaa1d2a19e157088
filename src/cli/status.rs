//! `status`: components of every feature repo and the dependency overrides.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{CommandContext, CommandExecutor};
use crate::dependency::UserDependency;

/// Show component states and dependency overrides.
#[derive(Debug, Clone, Args)]
pub struct StatusCommand {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ComponentStatus {
    name: String,
    tool: String,
    active: bool,
}

#[derive(Debug, Serialize)]
struct RepoStatus {
    name: String,
    components: Vec<ComponentStatus>,
}

#[derive(Debug, Serialize)]
struct Status {
    repos: Vec<RepoStatus>,
    dependencies: Vec<UserDependency>,
}

fn collect(ctx: &mut CommandContext) -> Result<Status> {
    let mut repos = Vec::new();
    for (repo, catalog) in ctx.workspace.feature_catalogs()? {
        let mut components = Vec::new();
        for (tool, items) in catalog.components_by_tool() {
            let mut items: Vec<_> = items.iter().collect();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            components.extend(items.into_iter().map(|c| ComponentStatus {
                name: c.name.clone(),
                tool: tool.to_string(),
                active: repo.is_active(c),
            }));
        }
        repos.push(RepoStatus {
            name: repo.name,
            components,
        });
    }
    Ok(Status {
        repos,
        dependencies: ctx.workspace.dependencies.dependencies.clone(),
    })
}

impl CommandExecutor for StatusCommand {
    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        let status = collect(ctx)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        println!("{} {}", "Feature:".cyan(), ctx.workspace.config.current_feature.bold());
        if status.repos.is_empty() {
            println!("No repo in the current feature.");
        }
        for repo in &status.repos {
            println!("\n{}", repo.name.bold());
            let mut last_tool = "";
            for component in &repo.components {
                if component.tool != last_tool {
                    println!("  {}", component.tool.cyan());
                    last_tool = &component.tool;
                }
                if component.active {
                    println!("    {} {}", "+".green().bold(), component.name);
                } else {
                    println!("    {} {}", "-".dimmed(), component.name.strikethrough().dimmed());
                }
            }
        }

        if !status.dependencies.is_empty() {
            println!("\n{}", "Dependencies:".cyan());
            for dependency in &status.dependencies {
                println!("  {dependency}");
            }
        }
        Ok(())
    }
}
