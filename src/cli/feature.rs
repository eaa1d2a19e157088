//! `feature start`: create or switch to a feature.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;

use super::common::{CommandContext, CommandExecutor, PostRunHook, save_all_hooks};
use crate::core::MboxError;
use crate::dependency::{Dependency, UserDependency};

/// Manage features.
#[derive(Debug, Clone, Args)]
pub struct FeatureCommand {
    #[command(subcommand)]
    pub command: FeatureSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum FeatureSubcommand {
    /// Create a feature from the current one, or switch to an existing one
    Start(FeatureStartArgs),
}

#[derive(Debug, Clone, Args)]
pub struct FeatureStartArgs {
    /// Feature name
    pub name: String,

    /// Dependency overrides of the feature as JSON, e.g. `{"Baz": {"version": "1.0"}}`
    #[arg(long, value_name = "JSON")]
    pub dependencies: Option<String>,
}

/// Parse `{"Name": {fields}}` into overrides, in name order.
pub fn parse_dependencies(raw: &str) -> Result<Vec<UserDependency>, MboxError> {
    let parsed: BTreeMap<String, UserDependency> =
        serde_json::from_str(raw).map_err(|e| MboxError::InvalidDependencies {
            reason: e.to_string(),
        })?;
    Ok(parsed
        .into_iter()
        .map(|(name, mut record)| {
            record.dependency = Dependency {
                name: Some(name),
                ..record.dependency
            };
            record
        })
        .collect())
}

impl CommandExecutor for FeatureCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        save_all_hooks()
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        match self.command {
            FeatureSubcommand::Start(args) => {
                let dependencies = args.dependencies.as_deref().map(parse_dependencies).transpose()?;
                let created = ctx.workspace.start_feature(&args.name, dependencies)?;
                let verb = if created { "Created" } else { "Switched to" };
                println!("{}", format!("{verb} feature `{}`", args.name).green());
                Ok(())
            }
        }
    }
}
