//! Error handling for the MBox dependency manager
//!
//! This module provides the error taxonomy and user-friendly error reporting for
//! the dependency manager commands. The error system follows two principles:
//! 1. **Strongly-typed errors** for the user-actionable failure cases
//! 2. **User-friendly messages** with suggestions when shown on the CLI
//!
//! # Architecture
//!
//! - [`MboxError`] - Enumerated error types for every user-actionable failure
//! - [`ErrorContext`] - Wrapper that adds a suggestion and details for display
//!
//! # Error Categories
//!
//! - **User errors**: [`MboxError::UnknownTool`], [`MboxError::ComponentNotFound`],
//!   [`MboxError::RepoNotFound`], [`MboxError::MissingArgument`],
//!   [`MboxError::InvalidLocalPath`], [`MboxError::PackageOwnedByRepo`]
//! - **Workspace state**: [`MboxError::WorkspaceNotFound`], [`MboxError::ConfigParseError`],
//!   [`MboxError::SaveFailed`]
//! - **Resolution**: [`MboxError::NoSearchEngine`]
//!
//! Search engine failures are deliberately absent: they are logged and treated as
//! "no result from this engine" by the resolver, never surfaced to the user.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mbox_dependency_manager::core::{MboxError, user_friendly_error};
//!
//! let error = MboxError::UnknownTool { name: "gradle".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for dependency manager operations.
///
/// Every variant names the offending value so the CLI message is actionable on
/// its own. Variants map one-to-one to a suggestion in [`user_friendly_error`].
#[derive(Error, Debug)]
pub enum MboxError {
    /// No `.mbox/config.json` was found in the current directory or any parent.
    #[error("Not inside an MBox workspace (no .mbox/config.json found from {path})")]
    WorkspaceNotFound {
        /// Directory the search started from
        path: String,
    },

    /// A tool name does not belong to the dependency tool registry.
    #[error("The dependency tool `{name}` is not found")]
    UnknownTool {
        /// The requested tool name
        name: String,
    },

    /// A repository name does not match any repo of the current feature.
    #[error("Could not find repo which named `{name}`")]
    RepoNotFound {
        /// The requested repository name
        name: String,
    },

    /// A component name could not be resolved for any requested tool.
    #[error("Could not find component which named `{name}`{}", .repo.as_ref().map(|r| format!(" in repo `{r}`")).unwrap_or_default())]
    ComponentNotFound {
        /// The requested component name
        name: String,
        /// Repository the lookup was restricted to, if any
        repo: Option<String>,
    },

    /// A required argument is missing or the arguments are contradictory.
    #[error("{message}")]
    MissingArgument {
        /// Human-readable description of what is missing
        message: String,
    },

    /// A local dependency path does not exist on disk.
    #[error("The path does not exist: {path}")]
    InvalidLocalPath {
        /// The expanded absolute path that was checked
        path: String,
    },

    /// A dependency override was requested for a package owned by a workspace repo.
    #[error("[{repo}] contains the package `{name}`, you could not set external dependency when it was added")]
    PackageOwnedByRepo {
        /// Name of the owning repository
        repo: String,
        /// The package name
        name: String,
    },

    /// The resolver was asked to search without any engine configured.
    #[error("There is not a valid dependency search engine")]
    NoSearchEngine,

    /// A persisted file could not be parsed.
    #[error("Invalid syntax in {file}: {reason}")]
    ConfigParseError {
        /// The file that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A persisted file could not be written.
    #[error("Save Failed: `{path}`")]
    SaveFailed {
        /// The file that could not be written
        path: String,
    },

    /// The `--dependencies` JSON given to `feature start` is malformed.
    #[error("Invalid dependencies JSON: {reason}")]
    InvalidDependencies {
        /// Parser message
        reason: String,
    },

    /// A git invocation exited unsuccessfully.
    #[error("Git operation failed: {operation}\n{stderr}")]
    GitCommandError {
        /// The git subcommand
        operation: String,
        /// Captured standard error
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Any other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl MboxError {
    /// Whether this error is caused by user input rather than the environment.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. }
                | Self::RepoNotFound { .. }
                | Self::ComponentNotFound { .. }
                | Self::MissingArgument { .. }
                | Self::InvalidLocalPath { .. }
                | Self::PackageOwnedByRepo { .. }
                | Self::InvalidDependencies { .. }
        )
    }
}

/// Error context wrapper that carries a suggestion and details for display.
///
/// Built by [`user_friendly_error`]; printed by `main` before exiting non-zero.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, already rendered
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a rendered error message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`MboxError`] anywhere in the error chain, then [`std::io::Error`];
/// everything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(mbox_error) = error.chain().find_map(|e| e.downcast_ref::<MboxError>()) {
        return create_error_context(mbox_error, &error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(error_with_chain(&error))
                    .with_suggestion("Check the ownership and permissions of the workspace files");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(error_with_chain(&error))
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(error_with_chain(&error))
}

fn error_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: &MboxError, full: &anyhow::Error) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        MboxError::WorkspaceNotFound { .. } => ctx
            .with_suggestion("Run 'mbox-dp init' in the workspace root, or pass --workspace <DIR>")
            .with_details("The workspace root is the directory containing .mbox/config.json"),

        MboxError::UnknownTool { .. } => ctx
            .with_suggestion("Use one of the tools configured under [[dependency_manager.tools]]")
            .with_details("Without configuration the tools are `cocoapods` and `bundler`"),

        MboxError::RepoNotFound { name } => {
            ctx.with_suggestion(format!("Add the repo first with 'mbox-dp add {name}'"))
        }

        MboxError::ComponentNotFound { .. } => ctx
            .with_suggestion("Run 'mbox-dp status' to list the components exposed by each repo"),

        MboxError::InvalidLocalPath { .. } => ctx
            .with_suggestion("Use an absolute path, a path relative to the workspace root, or a ~ path"),

        MboxError::PackageOwnedByRepo { repo, .. } => ctx.with_suggestion(format!(
            "Remove the repo `{repo}` first, or activate/deactivate its components instead"
        )),

        MboxError::NoSearchEngine => ctx
            .with_details("Dependency search needs the user dependency file or a registry index")
            .with_suggestion("Configure `dependency_manager.registry` in .mbox/setting.toml"),

        MboxError::ConfigParseError { file, .. } => ctx
            .with_suggestion(format!("Fix the syntax in {file}, or restore it from version control")),

        MboxError::SaveFailed { .. } => ctx
            .with_details(error_with_chain(full))
            .with_suggestion("Check disk space and write permissions for the workspace"),

        MboxError::InvalidDependencies { .. } => ctx.with_suggestion(
            r#"Pass a JSON object keyed by name, e.g. {"AFNetworking": {"version": "2.0"}}"#,
        ),

        _ => ErrorContext::new(error_with_chain(full)),
    }
}
