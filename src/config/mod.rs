//! Configuration management for the dependency manager
//!
//! Settings are layered TOML files:
//!
//! 1. **Global** (`~/.mbox/setting.toml`, `$MBOX_CONFIG`, or `--config`)
//! 2. **Workspace** (`<root>/.mbox/setting.toml`) - overrides global values field by field
//! 3. **Repo** (`<repo>/.mbox/setting.toml`) - consulted on its own when a repo is first added
//!
//! A missing file is an empty layer. All recognised keys live under the
//! `[dependency_manager]` table:
//!
//! ```toml
//! [dependency_manager]
//! activate_all_components_after_add_repo = false
//! ambiguous_name_policy = "component"
//! registry = "registry.yml"
//!
//! [[dependency_manager.tools]]
//! name = "cocoapods"
//! patterns = ["*.podspec", "*.podspec.json"]
//! ```

mod settings;

pub use settings::{AmbiguityPolicy, DependencyManagerSettings, Settings, ToolDefinition};
