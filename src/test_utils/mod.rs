//! Test utilities for the dependency manager.
//!
//! - [`init_test_logging`] installs a test-writer tracing subscriber once
//! - [`TestWorkspaceBuilder`] lays out a temporary workspace with repo
//!   working copies and manifest fixtures
//!
//! # Example
//!
//! ```rust,no_run
//! use mbox_dependency_manager::test_utils::TestWorkspaceBuilder;
//!
//! let ws = TestWorkspaceBuilder::new()
//!     .unwrap()
//!     .with_repo("Foo", &["Foo.podspec", "Sub/Bar.podspec", "Foo.gemspec"])
//!     .build()
//!     .unwrap();
//! assert!(ws.root().join("Foo/Sub/Bar.podspec").exists());
//! ```

pub mod builder;

pub use builder::{TestWorkspace, TestWorkspaceBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, else `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
