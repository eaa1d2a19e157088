//! Shared argument models for the CLI commands.
//!
//! These `clap::Args` groups are flattened into several commands so that the
//! same flag always parses the same way.

use clap::Args;

use crate::dependency::DependencyChange;

/// `--tool NAME...`: restrict a command to some dependency tools.
#[derive(Debug, Clone, Default, Args)]
pub struct ToolArgs {
    /// Dependency tool to operate on (repeatable); every tool when omitted
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,
}

/// Targets of `activate` / `deactivate`.
#[derive(Debug, Clone, Default, Args)]
pub struct ActivationTargetArgs {
    /// Components to change
    ///
    /// Accepted forms:
    /// • `Repo` - every component of the repo (or its same-named component)
    /// • `Repo/Component` - one component of one repo
    /// • `Component` - the component, searched in every repo
    /// • `Repo/*` - every component of the repo
    /// • `*` - every component of every repo
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Apply to every component of every repo
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// Edits accepted by `depend`.
///
/// The three groups (version/source/binary, git pointer, path) are mutually
/// exclusive on write; see [`crate::dependency::Dependency::change`].
#[derive(Debug, Clone, Default, Args)]
pub struct DependencyChangeArgs {
    /// Released version
    #[arg(long)]
    pub version: Option<String>,

    /// Package source the version is taken from
    #[arg(long, value_name = "SOURCE")]
    pub source: Option<String>,

    /// Git repository URL
    #[arg(long, value_name = "URL")]
    pub git: Option<String>,

    /// Git branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Git commit
    #[arg(long)]
    pub commit: Option<String>,

    /// Git tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Local directory (absolute, `~/...` or relative to the workspace root)
    #[arg(long)]
    pub path: Option<String>,

    /// Use the prebuilt binary
    #[arg(long, conflicts_with = "use_source")]
    pub binary: bool,

    /// Build from source code instead of the binary
    #[arg(long)]
    pub use_source: bool,
}

impl DependencyChangeArgs {
    #[must_use]
    pub fn to_change(&self) -> DependencyChange {
        let binary = if self.binary {
            Some(true)
        } else if self.use_source {
            Some(false)
        } else {
            None
        };
        DependencyChange {
            version: self.version.clone(),
            source: self.source.clone(),
            git: self.git.clone(),
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            tag: self.tag.clone(),
            path: self.path.clone(),
            binary,
        }
    }
}
