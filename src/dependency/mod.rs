//! Dependency descriptors.
//!
//! A [`Dependency`] describes one external package reference: where it comes
//! from (a version in a source, a git pointer, or a local path) and whether the
//! binary flavor is wanted. The descriptor is shared by the user override file,
//! the search engines and the repo-creation path of `add`.
//!
//! # Modes
//!
//! The fields form three mutually exclusive groups on write (see
//! [`Dependency::change`]), and one derived [`DependencyMode`] on read:
//!
//! | Mode | Condition (checked in this order) |
//! |------|-----------------------------------|
//! | `Remote` | any of `git`, `branch`, `commit`, `tag` |
//! | `Local` | `path` |
//! | `Version` | `version` or `source` |
//! | `BinarySwitch` | `binary` |
//! | `Unknown` | nothing set |

mod user;

pub use user::{UserDependency, UserDependencyFile};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived classification of a [`Dependency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyMode {
    /// Points at a git repository (url and/or branch/commit/tag)
    Remote,
    /// Points at a directory on disk
    Local,
    /// Pinned to a released version and/or source
    Version,
    /// Only toggles between binary and source flavors
    BinarySwitch,
    /// Nothing is set
    Unknown,
}

/// A reference to a branch, commit or tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitPointer {
    /// A branch name
    Branch(String),
    /// A commit SHA
    Commit(String),
    /// A tag name
    Tag(String),
}

impl fmt::Display for GitPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(v) => write!(f, "branch `{v}`"),
            Self::Commit(v) => write!(f, "commit `{v}`"),
            Self::Tag(v) => write!(f, "tag `{v}`"),
        }
    }
}

/// A descriptor of one external package reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Released version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Package source (spec repository)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Git repository URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    /// Git branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Git commit SHA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Git tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Local path (absolute, `~`-relative or relative to the workspace root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Use the binary flavor (`false` = source flavor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<bool>,
    /// Download URL of a prebuilt artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    /// Tool-specific dependency type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// When a search engine discovered (released) this reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Project homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// A group-wise edit of a [`Dependency`], as given on the `depend` command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyChange {
    pub version: Option<String>,
    pub source: Option<String>,
    pub git: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub tag: Option<String>,
    pub path: Option<String>,
    pub binary: Option<bool>,
}

impl DependencyChange {
    /// Whether the change touches any field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Dependency {
    /// Create an empty descriptor for `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Classify the descriptor. Earlier groups win when several are set.
    #[must_use]
    pub fn mode(&self) -> DependencyMode {
        if self.git.is_some() || self.commit.is_some() || self.branch.is_some() || self.tag.is_some()
        {
            DependencyMode::Remote
        } else if self.path.is_some() {
            DependencyMode::Local
        } else if self.version.is_some() || self.source.is_some() {
            DependencyMode::Version
        } else if self.binary.is_some() {
            DependencyMode::BinarySwitch
        } else {
            DependencyMode::Unknown
        }
    }

    /// Remote and local references are resolved outside the package registry.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.mode(), DependencyMode::Remote | DependencyMode::Local)
    }

    /// The git pointer with precedence branch > commit > tag.
    #[must_use]
    pub fn git_pointer(&self) -> Option<GitPointer> {
        if let Some(branch) = &self.branch {
            Some(GitPointer::Branch(branch.clone()))
        } else if let Some(commit) = &self.commit {
            Some(GitPointer::Commit(commit.clone()))
        } else {
            self.tag.as_ref().map(|tag| GitPointer::Tag(tag.clone()))
        }
    }

    /// Replace branch/commit/tag with a single pointer.
    pub fn set_git_pointer(&mut self, pointer: GitPointer) {
        self.branch = None;
        self.commit = None;
        self.tag = None;
        match pointer {
            GitPointer::Branch(v) => self.branch = Some(v),
            GitPointer::Commit(v) => self.commit = Some(v),
            GitPointer::Tag(v) => self.tag = Some(v),
        }
    }

    fn clear_git(&mut self) {
        self.git = None;
        self.commit = None;
        self.branch = None;
        self.tag = None;
    }

    /// Apply an edit group-wise; the last written group wins.
    ///
    /// - any of `binary`, `version`, `source`: clears git fields and `path`
    /// - any of `git`, `branch`, `commit`, `tag`: clears `path`, `version`, `source`, `binary`
    /// - `path` alone: clears everything else
    pub fn change(&mut self, change: DependencyChange) {
        if change.binary.is_some() || change.version.is_some() || change.source.is_some() {
            self.clear_git();
            self.path = None;
            if change.binary.is_some() {
                self.binary = change.binary;
            }
            if change.version.is_some() {
                self.version = change.version;
            }
            if change.source.is_some() {
                self.source = change.source;
            }
        } else if change.git.is_some()
            || change.branch.is_some()
            || change.commit.is_some()
            || change.tag.is_some()
        {
            self.path = None;
            self.version = None;
            self.source = None;
            self.binary = None;
            if change.git.is_some() {
                self.git = change.git;
            }
            if change.branch.is_some() {
                self.branch = change.branch;
            }
            if change.commit.is_some() {
                self.commit = change.commit;
            }
            if change.tag.is_some() {
                self.tag = change.tag;
            }
        } else if change.path.is_some() {
            self.clear_git();
            self.version = None;
            self.source = None;
            self.binary = None;
            self.path = change.path;
        }
    }

    /// Overlay `other` onto a copy of `self`: set fields of `other` win, unset
    /// fields keep the value from `self`.
    #[must_use]
    pub fn merge(&self, other: &Dependency) -> Dependency {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }
        Dependency {
            name: pick(&self.name, &other.name),
            version: pick(&self.version, &other.version),
            source: pick(&self.source, &other.source),
            git: pick(&self.git, &other.git),
            branch: pick(&self.branch, &other.branch),
            commit: pick(&self.commit, &other.commit),
            tag: pick(&self.tag, &other.tag),
            path: pick(&self.path, &other.path),
            binary: pick(&self.binary, &other.binary),
            http: pick(&self.http, &other.http),
            kind: pick(&self.kind, &other.kind),
            date: pick(&self.date, &other.date),
            homepage: pick(&self.homepage, &other.homepage),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(version) = &self.version {
            parts.push(version.clone());
        }
        if let Some(source) = &self.source {
            parts.push(format!("source `{source}`"));
        }
        if let Some(git) = &self.git {
            parts.push(format!("from `{git}`"));
        }
        if let Some(branch) = &self.branch {
            parts.push(format!("branch `{branch}`"));
        }
        if let Some(commit) = &self.commit {
            parts.push(format!("commit `{commit}`"));
        }
        if let Some(tag) = &self.tag {
            parts.push(format!("tag `{tag}`"));
        }
        if let Some(path) = &self.path {
            parts.push(format!("path `{path}`"));
        }
        if let Some(binary) = self.binary {
            parts.push(if binary { "using binary" } else { "using source code" }.to_string());
        }
        f.write_str(&parts.join(", "))
    }
}
