//! Command-line interface of the MBox dependency manager plugin.
//!
//! Every command except `init` runs against the workspace enclosing the
//! current directory (or `--workspace`). Commands do their work in memory and
//! declare post-run hooks that persist it; see [`common`].
//!
//! # Commands
//!
//! - `init` - create `.mbox/config.json`
//! - `add` - add a repo to the current feature and activate its components
//! - `remove` - drop a repo from the current feature
//! - `activate` / `deactivate` - toggle components
//! - `depend` - show and edit dependency overrides
//! - `status` - show component states and overrides
//! - `search` - show which repo `add` would use
//! - `feature start` - create or switch features
//!
//! # Examples
//!
//! ```bash
//! mbox-dp init
//! mbox-dp add Foo --component Bar
//! mbox-dp deactivate Foo/Bar
//! mbox-dp depend Baz --version 2.0
//! mbox-dp --verbose status --json
//! ```

pub mod activate;
pub mod add;
pub mod common;
pub mod depend;
pub mod feature;
pub mod init;
pub mod remove;
pub mod search;
pub mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use common::{CommandContext, CommandExecutor};

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can run commands with an explicit
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter; `None` defers to `RUST_LOG`, then `warn`
    pub log_level: Option<String>,
    /// Global settings file overriding `$MBOX_CONFIG` and `~/.mbox/setting.toml`
    pub config_path: Option<PathBuf>,
    /// Directory to start the workspace search from
    pub workspace: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Calling it twice is harmless; the second subscriber is ignored.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// MBox dependency manager.
#[derive(Parser)]
#[command(
    name = "mbox-dp",
    about = "Manage components and dependency overrides of an MBox workspace",
    version,
    long_about = "Add repositories to a feature, choose which of their components are active, \
                  and override how external dependencies are resolved."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Global settings file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Workspace directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a workspace
    Init(init::InitCommand),

    /// Add a repository and activate its components
    Add(add::AddCommand),

    /// Remove a repository from the current feature
    Remove(remove::RemoveCommand),

    /// Activate components
    Activate(activate::ActivateCommand),

    /// Deactivate components
    Deactivate(activate::DeactivateCommand),

    /// Show or edit dependency overrides
    Depend(depend::DependCommand),

    /// Show component states and dependency overrides
    Status(status::StatusCommand),

    /// Show which repository `add` would use for a name
    Search(search::SearchCommand),

    /// Manage features
    Feature(feature::FeatureCommand),
}

impl Cli {
    /// Build the runtime configuration from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };
        CliConfig {
            log_level,
            config_path: self.config.clone(),
            workspace: self.workspace.clone(),
        }
    }

    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config)
    }

    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let start = match config.workspace {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read the current directory")?,
        };

        let config_path = config.config_path.as_deref();
        match self.command {
            Commands::Init(cmd) => cmd.execute_in(&start),
            Commands::Add(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Remove(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Activate(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Deactivate(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Depend(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Status(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Search(cmd) => run_in_workspace(cmd, &start, config_path),
            Commands::Feature(cmd) => run_in_workspace(cmd, &start, config_path),
        }
    }
}

fn run_in_workspace<C: CommandExecutor>(
    command: C,
    start: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut ctx = CommandContext::discover(start, config_path)?;
    command.run(&mut ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_and_quiet_levels() {
        let cli = Cli::parse_from(["mbox-dp", "--verbose", "status"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["mbox-dp", "status", "--quiet"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("error"));

        let cli = Cli::parse_from(["mbox-dp", "--workspace", "/ws", "status"]);
        let config = cli.build_config();
        assert_eq!(config.log_level, None);
        assert_eq!(config.workspace, Some(PathBuf::from("/ws")));

        assert!(Cli::try_parse_from(["mbox-dp", "-v", "-q", "status"]).is_err());
    }

    #[test]
    fn test_add_flags_parse() {
        let cli = Cli::parse_from([
            "mbox-dp",
            "add",
            "Foo",
            "--component",
            "Bar",
            "--component",
            "Baz",
            "--tool",
            "cocoapods",
            "--no-activate-all-components",
        ]);
        let Commands::Add(add) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(add.components, vec!["Bar", "Baz"]);
        assert_eq!(add.tools, vec!["cocoapods"]);
        assert!(add.no_activate_all_components);
        assert!(
            Cli::try_parse_from([
                "mbox-dp",
                "add",
                "Foo",
                "--activate-all-components",
                "--no-activate-all-components"
            ])
            .is_err()
        );
    }
}
