//! `remove`: drop a repository from the current feature.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, CommandExecutor, PostRunHook, save_all_hooks};
use crate::core::MboxError;

/// Remove a repository from the current feature.
#[derive(Debug, Clone, Args)]
pub struct RemoveCommand {
    /// Repository name
    pub name: String,
}

impl CommandExecutor for RemoveCommand {
    fn post_run_hooks(&self) -> Vec<Box<dyn PostRunHook>> {
        save_all_hooks()
    }

    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        let removed = ctx
            .workspace
            .current_feature_mut()?
            .remove_repo(&self.name)
            .ok_or_else(|| MboxError::RepoNotFound {
                name: self.name.clone(),
            })?;
        ctx.workspace.invalidate_catalog(&removed.name);
        println!("{}", format!("Removed repo `{}`", removed.name).green());
        Ok(())
    }
}
