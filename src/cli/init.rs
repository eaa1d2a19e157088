//! `init`: create `.mbox/config.json` in a directory.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::utils::fs::ensure_dir;
use crate::workspace::Workspace;

/// Initialize a workspace.
#[derive(Debug, Clone, Args)]
pub struct InitCommand {
    /// Workspace directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl InitCommand {
    pub fn execute_in(self, default_dir: &Path) -> Result<()> {
        let root = self.path.unwrap_or_else(|| default_dir.to_path_buf());
        ensure_dir(&root)?;
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", root.display()))?;

        if Workspace::init(&root)? {
            println!("{} Initialized workspace at {}", "✓".green(), root.display());
        } else {
            println!("Workspace already exists at {}", root.display());
        }
        Ok(())
    }
}
