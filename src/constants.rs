//! File names and well-known values shared across modules.

/// Directory holding workspace metadata, relative to the workspace root.
pub const CONFIG_DIR: &str = ".mbox";

/// Workspace config file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Settings file name, at global, workspace (`<root>/.mbox/`) and repo
/// (`<repo>/.mbox/`) scope.
pub const SETTING_FILE: &str = "setting.toml";

/// Changed-dependencies lock inside [`CONFIG_DIR`].
pub const DEPENDENCIES_LOCK_FILE: &str = "dependencies.lock";

/// Current feature's user dependency overrides, at the workspace root.
pub const USER_DEPENDENCY_FILE: &str = "MBox.dependencies.yml";

/// Feature every new workspace starts in.
pub const FREE_MODE_FEATURE: &str = "FreeMode";

/// Environment variable overriding the global settings path.
pub const CONFIG_ENV: &str = "MBOX_CONFIG";

/// Priority of the engine searching the current feature's overrides.
pub const USER_DEPENDENCY_ENGINE_PRIORITY: i32 = 100;

/// Priority of the registry index engine.
pub const REGISTRY_ENGINE_PRIORITY: i32 = 10;
