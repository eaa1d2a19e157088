//! Fluent builder for blocking `git` invocations.
//!
//! Every git call in the crate goes through [`GitCommand`] so that logging and
//! error mapping stay uniform. Commands run with `-C <dir>` when a working
//! directory is set, capture their output, and map a non-zero exit into
//! [`MboxError::GitCommandError`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::MboxError;

/// Builder for one git command.
///
/// # Examples
///
/// ```rust,no_run
/// use mbox_dependency_manager::git::command_builder::GitCommand;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let sha = GitCommand::new()
///     .args(["rev-list", "-n", "1", "1.0.0"])
///     .current_dir(Path::new("/path/to/repo"))
///     .with_context("Resolving tag 1.0.0")
///     .execute_stdout()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GitCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    context: Option<String>,
}

/// Output from a git command.
#[derive(Debug)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitCommand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run inside `dir` (passed to git as `-C dir`).
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Label used in debug logs.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(dir) = &self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    fn run(&self) -> Result<std::process::Output> {
        let full_args = self.full_args();
        match &self.context {
            Some(ctx) => tracing::debug!(target: "git", "({ctx}) Executing: git {}", full_args.join(" ")),
            None => tracing::debug!(target: "git", "Executing: git {}", full_args.join(" ")),
        }

        let mut cmd = Command::new("git");
        cmd.args(&full_args);
        cmd.output()
            .with_context(|| format!("Failed to execute git {}", full_args.join(" ")))
    }

    /// Execute and fail on a non-zero exit status.
    pub fn execute(self) -> Result<GitCommandOutput> {
        let output = self.run()?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
            return Err(MboxError::GitCommandError {
                operation: self.operation(),
                stderr: stderr.trim().to_string(),
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{}", stdout.trim());
        }
        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute and return trimmed stdout.
    pub fn execute_stdout(self) -> Result<String> {
        let output = self.execute()?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute a predicate command: exit 0 is `true`, exit 1 is `false`,
    /// anything else is an error.
    pub fn execute_check(self) -> Result<bool> {
        let output = self.run()?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(MboxError::GitCommandError {
                operation: self.operation(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into()),
        }
    }
}

// Convenience builders for the operations the resolver needs

impl GitCommand {
    /// Resolve a tag to the commit it points at.
    #[must_use]
    pub fn commit_for_tag(tag: &str) -> Self {
        Self::new().args(["rev-list", "-n", "1"]).arg(tag)
    }

    /// Exit 0 when `ancestor` is an ancestor of `descendant`.
    #[must_use]
    pub fn is_ancestor(ancestor: &str, descendant: &str) -> Self {
        Self::new()
            .args(["merge-base", "--is-ancestor"])
            .arg(ancestor)
            .arg(descendant)
    }

    #[must_use]
    pub fn remote_url() -> Self {
        Self::new().args(["config", "--get", "remote.origin.url"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_args_prefix_working_dir() {
        let cmd = GitCommand::commit_for_tag("1.0.0").current_dir("/repo");
        assert_eq!(cmd.full_args(), vec!["-C", "/repo", "rev-list", "-n", "1", "1.0.0"]);
        assert_eq!(cmd.operation(), "rev-list");
    }

    #[test]
    fn test_is_ancestor_args() {
        let cmd = GitCommand::is_ancestor("c1", "c2");
        assert_eq!(cmd.full_args(), vec!["merge-base", "--is-ancestor", "c1", "c2"]);
    }
}
