//! `depend`: show and edit the current feature's dependency overrides.
//!
//! Without options the overrides are listed. With names and an edit option
//! the named overrides are created or changed; `--reset` removes them.
//!
//! ```bash
//! mbox-dp depend
//! mbox-dp depend Baz --version 2.0
//! mbox-dp depend Baz --git https://github.com/example/Baz.git --branch develop --tool cocoapods
//! mbox-dp depend Baz --reset
//! mbox-dp depend --show-changes
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::{Value, json};

use super::common::{
    CommandContext, CommandExecutor, PostRunHook, SaveChangedDependenciesLock, SaveDependencies,
};
use crate::core::{DependencyTool, MboxError};
use crate::lockfile::{DependencyLock, changed_dependencies_for};
use crate::models::DependencyChangeArgs;
use crate::workspace::{RepoConfig, WorkRepo};

/// Show or edit dependency overrides.
#[derive(Debug, Clone, Args)]
pub struct DependCommand {
    /// Dependency names
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    #[command(flatten)]
    pub change: DependencyChangeArgs,

    /// Remove the overrides of the given names, or all of them
    #[arg(long)]
    pub reset: bool,

    /// Print every override and every component state as JSON
    #[arg(long)]
    pub show_all: bool,

    /// Print the changed dependencies as JSON
    #[arg(long)]
    pub show_changes: bool,

    /// Scope the command to one dependency tool
    #[arg(long, value_name = "NAME")]
    pub tool: Option<String>,
}

impl DependCommand {
    fn is_edit(&self) -> bool {
        !self.names.is_empty() && !self.change.to_change().is_empty()
    }

    fn mutates(&self) -> bool {
        !self.show_all && !self.show_changes && (self.reset || self.is_edit())
    }

    /// Overrides and component states of one tool; empty when it has neither.
    fn tool_overview(
        ctx: &CommandContext,
        catalogs: &[(RepoConfig, WorkRepo)],
        tool: &DependencyTool,
    ) -> serde_json::Map<String, Value> {
        let dependencies: Vec<_> = ctx.workspace.dependencies.dependencies_for(Some(tool)).collect();
        let components: Vec<Value> = catalogs
            .iter()
            .flat_map(|(repo, catalog)| {
                catalog.components_for(tool).iter().map(move |c| {
                    json!({ "name": c.name, "repo": repo.name, "active": repo.is_active(c) })
                })
            })
            .collect();

        let mut overview = serde_json::Map::new();
        if !dependencies.is_empty() {
            overview.insert("dependencies".to_string(), json!(dependencies));
        }
        if !components.is_empty() {
            overview.insert("components".to_string(), Value::Array(components));
        }
        overview
    }

    /// One tool's overview as is, or every non-empty overview keyed by tool.
    fn show_all_output(ctx: &mut CommandContext, tool: Option<&DependencyTool>) -> Result<Value> {
        let catalogs = ctx.workspace.feature_catalogs()?;
        if let Some(tool) = tool {
            return Ok(Value::Object(Self::tool_overview(ctx, &catalogs, tool)));
        }
        let mut output = serde_json::Map::new();
        for tool in ctx.workspace.registry.all_tools() {
            let overview = Self::tool_overview(ctx, &catalogs, &tool);
            if !overview.is_empty() {
                output.insert(tool.to_string(), Value::Object(overview));
            }
        }
        Ok(Value::Object(output))
    }

    fn print_changes(ctx: &mut CommandContext, tool: Option<&DependencyTool>) -> Result<()> {
        let output = match tool {
            Some(tool) => serde_json::to_value(changed_dependencies_for(&mut ctx.workspace, tool)?)?,
            None => serde_json::to_value(DependencyLock::compute(&mut ctx.workspace)?)?,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn reset_records(&self, ctx: &mut CommandContext, tool: Option<&DependencyTool>) {
        if self.names.is_empty() {
            ctx.workspace.dependencies.remove_all(tool);
            println!("{}", "Reset all dependencies".green());
        } else {
            for name in &self.names {
                ctx.workspace.dependencies.remove(name, tool);
                println!("{}", format!("Reset dependency `{name}`").green());
            }
        }
    }

    fn edit(&self, ctx: &mut CommandContext, tool: Option<&DependencyTool>) -> Result<()> {
        let catalogs = ctx.workspace.feature_catalogs()?;
        for name in &self.names {
            if let Some((repo, _)) = catalogs.iter().find(|(_, catalog)| {
                catalog.package_names().iter().any(|p| p.eq_ignore_ascii_case(name))
            }) {
                return Err(MboxError::PackageOwnedByRepo {
                    repo: repo.name.clone(),
                    name: name.clone(),
                }
                .into());
            }
        }

        let change = self.change.to_change();
        for name in &self.names {
            let record = ctx.workspace.dependencies.dependency_or_insert(name, tool);
            record.dependency.change(change.clone());
        }
        Ok(())
    }

    fn show_named(&self, ctx: &CommandContext, tool: Option<&DependencyTool>) {
        for name in &self.names {
            match ctx.workspace.dependencies.dependency(name, tool) {
                Some(record) => println!("{record}"),
                None => println!("No configure for dependency `{name}`."),
            }
        }
    }
}

impl CommandExecutor for DependCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        if self.mutates() {
            vec![Box::new(SaveDependencies), Box::new(SaveChangedDependenciesLock)]
        } else {
            Vec::new()
        }
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        let tool = self.tool.as_deref().map(|name| ctx.workspace.registry.tool(name)).transpose()?;

        if self.show_all {
            let output = Self::show_all_output(ctx, tool.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        if self.show_changes {
            return Self::print_changes(ctx, tool.as_ref());
        }

        if self.reset {
            self.reset_records(ctx, tool.as_ref());
            if !self.is_edit() {
                return Ok(());
            }
        }
        if self.is_edit() {
            self.edit(ctx, tool.as_ref())?;
        }

        if !self.names.is_empty() {
            self.show_named(ctx, tool.as_ref());
            return Ok(());
        }

        let mut any = false;
        for record in ctx.workspace.dependencies.dependencies_for(tool.as_ref()) {
            println!("{record}");
            any = true;
        }
        if !any {
            println!("No configure custom dependencies.");
        }
        Ok(())
    }
}
