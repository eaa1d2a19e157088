//! MBox dependency manager
//!
//! Manages which components of the repositories in an MBox workspace are
//! active, and how their external dependencies are overridden.
//!
//! # Concepts
//!
//! - **Repo**: a source repository tracked by the current feature
//! - **Component**: a package a repo exposes to one dependency tool
//!   (a `*.podspec` for CocoaPods, a `*.gemspec` for Bundler)
//! - **Feature**: a branch-like unit of work owning repos and overrides
//! - **User dependency**: an override of how an external dependency resolves
//!
//! # Modules
//!
//! - [`workspace`] - workspace config, component catalogs and activation state
//! - [`dependency`] - dependency descriptors and the user override file
//! - [`resolver`] - dependency search and commit reconciliation
//! - [`tools`] - the dependency tool registry
//! - [`git`] - git history access through the system `git`
//! - [`lockfile`] - the changed-dependencies lock
//! - [`config`] - layered settings
//! - [`cli`] - command-line interface
//! - [`core`] - error types and shared value types
//! - [`utils`] - file helpers

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod dependency;
pub mod git;
pub mod lockfile;
pub mod models;
pub mod resolver;
pub mod tools;
pub mod utils;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
