//! Dependency tool identity.
//!
//! A [`DependencyTool`] names one dependency-management backend (for example
//! `cocoapods`). It is the classification key for components, activation
//! records and user dependency scopes. The set of valid tools is owned by the
//! [`ToolRegistry`](crate::tools::ToolRegistry) built at process start.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency-management backend, identified by its lowercase name.
///
/// Names are normalized on construction, so equality, hashing and ordering are
/// case-insensitive with respect to the name the user typed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DependencyTool(String);

impl DependencyTool {
    /// Create a tool value from any casing of its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// The normalized tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a user-supplied name.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.0 == name.trim().to_lowercase()
    }
}

impl From<String> for DependencyTool {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DependencyTool {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<DependencyTool> for String {
    fn from(value: DependencyTool) -> Self {
        value.0
    }
}

impl fmt::Display for DependencyTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
