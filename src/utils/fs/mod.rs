//! File system utilities
//!
//! Every persisted file of the workspace (config, user dependencies, lock,
//! settings) goes through this module. Writes are whole-file rewrites using a
//! temp-and-rename strategy; there is no file locking, so concurrent CLI
//! invocations against the same workspace race.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mbox_dependency_manager::utils::fs::{read_json_file, write_json_file};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let value: serde_json::Value = read_json_file(Path::new(".mbox/config.json"))?;
//! write_json_file(Path::new(".mbox/config.json"), &value, true)?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use dirs::ensure_dir;
pub use formats::{
    read_json_file, read_text_file, read_toml_file, read_yaml_file, write_json_file,
    write_text_file, write_yaml_file,
};
pub use paths::{expand_path, find_workspace_root, normalize_path, relative_path};
