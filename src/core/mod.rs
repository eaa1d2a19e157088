//! Core types shared by every command.
//!
//! - [`error`] - the [`MboxError`] taxonomy and user-facing [`ErrorContext`]
//! - [`tool`] - the [`DependencyTool`] classification key
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use mbox_dependency_manager::core::{MboxError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn lookup() -> Result<()> {
//!     Err(MboxError::RepoNotFound { name: "Foo".to_string() }.into())
//! }
//!
//! if let Err(e) = lookup() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.message.contains("Foo"));
//! }
//! ```

pub mod error;
pub mod tool;

pub use error::{ErrorContext, MboxError, user_friendly_error};
pub use tool::DependencyTool;
