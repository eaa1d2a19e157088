//! Shared helpers
//!
//! - [`fs`] - Atomic writes, structured file read/write and path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use mbox_dependency_manager::utils::fs::{ensure_dir, atomic_write};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new(".mbox"))?;
//! atomic_write(Path::new(".mbox/dependencies.lock"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
