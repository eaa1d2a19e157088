//! Path helpers: workspace discovery, `~` expansion and relative display.

use crate::constants::{CONFIG_DIR, CONFIG_FILE};
use crate::core::MboxError;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path, resolving `.` and `..` without touching the disk.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Expand `~` and resolve a relative path against `root`.
///
/// # Examples
///
/// ```rust,no_run
/// use mbox_dependency_manager::utils::fs::expand_path;
/// use std::path::Path;
///
/// let path = expand_path("../Baz", Path::new("/work/space"));
/// assert_eq!(path, Path::new("/work/Baz"));
/// ```
#[must_use]
pub fn expand_path(raw: &str, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&root.join(path))
    }
}

/// Express `path` relative to `base`, falling back to the absolute form when
/// the two share no prefix.
#[must_use]
pub fn relative_path(base: &Path, path: &Path) -> String {
    let base = normalize_path(base);
    let path = normalize_path(path);
    if let Ok(stripped) = path.strip_prefix(&base) {
        return stripped.display().to_string();
    }

    let base_parts: Vec<_> = base.components().collect();
    let path_parts: Vec<_> = path.components().collect();
    let common = base_parts.iter().zip(&path_parts).take_while(|(a, b)| a == b).count();
    if common <= 1 {
        return path.display().to_string();
    }

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in &path_parts[common..] {
        result.push(part);
    }
    result.display().to_string()
}

/// Walk up from `start` to the directory containing `.mbox/config.json`.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    loop {
        if current.join(CONFIG_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }

        if !current.pop() {
            return Err(MboxError::WorkspaceNotFound {
                path: start.display().to_string(),
            }
            .into());
        }
    }
}
