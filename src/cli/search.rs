//! `search`: show which repo `add` would use for a name.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, CommandExecutor};
use crate::core::MboxError;
use crate::workspace::RepoConfig;

/// Look up a repository by name.
#[derive(Debug, Clone, Args)]
pub struct SearchCommand {
    /// Repository or dependency name
    pub name: String,

    /// Skip the current feature and ask the search engines only
    #[arg(long)]
    pub only_search_remote: bool,
}

fn print_repo(repo: &RepoConfig, source: &str) {
    println!("{} ({source})", repo.name.bold());
    if let Some(url) = &repo.url {
        println!("  url: {url}");
    }
    if let Some(path) = &repo.path {
        println!("  path: {path}");
    }
    if let Some(pointer) = &repo.base_git_pointer {
        println!("  checkout: {pointer}");
    }
}

impl CommandExecutor for SearchCommand {
    fn execute(self, ctx: &mut CommandContext) -> Result<()> {
        if !self.only_search_remote {
            if let Some(repo) = ctx.workspace.current_feature()?.repo(&self.name) {
                print_repo(repo, "current feature");
                return Ok(());
            }
        }

        let found = ctx
            .resolver()?
            .search_dependency(std::slice::from_ref(&self.name), None, None)
            .ok_or_else(|| MboxError::RepoNotFound {
                name: self.name.clone(),
            })?;
        print_repo(&RepoConfig::from_dependency(&self.name, &found), "search engines");
        Ok(())
    }
}
