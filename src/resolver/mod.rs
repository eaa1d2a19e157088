//! Dependency search and reconciliation.
//!
//! A dependency name is looked up through an ordered list of
//! [`SearchEngine`]s. The result of the lookup is a set of candidate
//! [`Dependency`] descriptors which are then resolved one by one and
//! reconciled into a single canonical descriptor.
//!
//! # Search
//!
//! 1. **Current scope**: every engine is asked for records matching any of
//!    the names (`search_dependencies`); the first engine returning anything
//!    wins. In practice this is the feature's user overrides.
//! 2. **Registry scope**: when the current scope finds nothing, every engine
//!    is asked to resolve each name with no version and no URL constraint;
//!    the first hit wins.
//!
//! Engines are consulted in descending priority. An engine failing a lookup
//! is logged and treated as having found nothing.
//!
//! # Resolution
//!
//! Each candidate is resolved according to its [`DependencyMode`]: local
//! paths must exist, remote references pass through unchanged, and version
//! references are completed by asking the engines for the matching release.
//! The resolved fields are merged back onto the candidate.
//!
//! # Reconciliation
//!
//! When several candidates survive:
//!
//! - a local candidate wins outright;
//! - otherwise the candidates' commits are gathered, resolving tag-only
//!   candidates through the repository's git history;
//! - a single distinct commit is canonical;
//! - several commits on one linear history resolve to the latest of them;
//! - failing that, the commit of the most recently dated candidate is used;
//! - failing that, the first candidate is returned as is.

pub mod engines;

pub use engines::{RegistryEngine, UserDependencyEngine};

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::MboxError;
use crate::dependency::{Dependency, DependencyMode, GitPointer};
use crate::git::{GitHistory, git_urls_match};
use crate::utils::fs::expand_path;
use crate::workspace::RepoConfig;

/// A source of dependency descriptors.
pub trait SearchEngine {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Higher priorities are consulted first.
    fn priority(&self) -> i32;

    /// Records matching any of `names` in this engine's current scope.
    fn search_dependencies(&self, names: &[String]) -> Result<Vec<Dependency>>;

    /// The release of `name` matching `version` (newest when `None`),
    /// restricted to the git repository at `url` when given.
    fn resolve_dependency(
        &self,
        name: &str,
        version: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<Dependency>>;

    /// When `version` of `name` was released, if the engine knows.
    fn release_date(&self, _name: &str, _version: Option<&str>) -> Result<Option<DateTime<Utc>>> {
        Ok(None)
    }
}

/// Searches, resolves and reconciles dependency descriptors.
pub struct DependencyResolver {
    root: PathBuf,
    engines: Vec<Box<dyn SearchEngine>>,
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let engines: Vec<&str> = self.engines.iter().map(|e| e.name()).collect();
        f.debug_struct("DependencyResolver")
            .field("root", &self.root)
            .field("engines", &engines)
            .finish()
    }
}

impl DependencyResolver {
    /// Create a resolver for the workspace at `root`. Engines are ordered by
    /// descending priority; equal priorities keep their given order.
    pub fn new(root: impl Into<PathBuf>, mut engines: Vec<Box<dyn SearchEngine>>) -> Self {
        engines.sort_by_key(|e| std::cmp::Reverse(e.priority()));
        Self {
            root: root.into(),
            engines,
        }
    }

    #[must_use]
    pub fn engines(&self) -> &[Box<dyn SearchEngine>] {
        &self.engines
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the canonical descriptor for any of `names`.
    ///
    /// `created_repo` constrains version lookups to its git URL. `git` is the
    /// history used to reconcile commits; without it the date tie-break
    /// applies directly. Returns `None` when nothing is found, including when
    /// no engine is configured (logged as a warning).
    pub fn search_dependency(
        &self,
        names: &[String],
        created_repo: Option<&RepoConfig>,
        git: Option<&dyn GitHistory>,
    ) -> Option<Dependency> {
        match self.try_search_dependency(names, created_repo, git) {
            Ok(found) => found,
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    fn try_search_dependency(
        &self,
        names: &[String],
        created_repo: Option<&RepoConfig>,
        git: Option<&dyn GitHistory>,
    ) -> Result<Option<Dependency>, MboxError> {
        if self.engines.is_empty() {
            return Err(MboxError::NoSearchEngine);
        }

        let mut candidates = self.search_current(names);
        if candidates.is_empty() {
            candidates = self.search_registry(names);
        }
        if candidates.is_empty() {
            info!("Could not find dependency named {}", names.join(", "));
            return Ok(None);
        }

        let resolved: Vec<Dependency> = candidates
            .iter()
            .filter_map(|candidate| match self.resolve_dependency(candidate, created_repo) {
                Ok(dependency) => Some(dependency),
                Err(e) => {
                    warn!("Skip dependency `{}`: {e:#}", candidate.name.as_deref().unwrap_or_default());
                    None
                }
            })
            .collect();
        Ok(self.reconcile(resolved, git))
    }

    fn search_current(&self, names: &[String]) -> Vec<Dependency> {
        for engine in &self.engines {
            match engine.search_dependencies(names) {
                Ok(found) if !found.is_empty() => {
                    debug!("Found {} candidate(s) in {}", found.len(), engine.name());
                    return found;
                }
                Ok(_) => {}
                Err(e) => debug!("Search in {} failed: {e:#}", engine.name()),
            }
        }
        Vec::new()
    }

    /// Releases of every name from the first engine that knows any of them.
    fn search_registry(&self, names: &[String]) -> Vec<Dependency> {
        for engine in &self.engines {
            let found: Vec<Dependency> = names
                .iter()
                .filter_map(|name| match engine.resolve_dependency(name, None, None) {
                    Ok(Some(mut found)) => {
                        if found.name.is_none() {
                            found.name = Some(name.clone());
                        }
                        Some(found)
                    }
                    Ok(None) => None,
                    Err(e) => {
                        debug!("Resolve `{name}` in {} failed: {e:#}", engine.name());
                        None
                    }
                })
                .collect();
            if !found.is_empty() {
                debug!("Resolved {} release(s) from {}", found.len(), engine.name());
                return found;
            }
        }
        Vec::new()
    }

    /// Resolve one descriptor by mode and merge the result onto it.
    ///
    /// Fails only for a local path that does not exist.
    pub fn resolve_dependency(
        &self,
        dependency: &Dependency,
        created_repo: Option<&RepoConfig>,
    ) -> Result<Dependency, MboxError> {
        let resolved = match dependency.mode() {
            DependencyMode::Local => Some(self.resolve_local(dependency)?),
            DependencyMode::Version => self.resolve_version(dependency, created_repo),
            DependencyMode::Remote | DependencyMode::BinarySwitch | DependencyMode::Unknown => None,
        };
        Ok(match resolved {
            Some(resolved) => dependency.merge(&resolved),
            None => dependency.clone(),
        })
    }

    fn resolve_local(&self, dependency: &Dependency) -> Result<Dependency, MboxError> {
        let raw = dependency.path.as_deref().unwrap_or_default();
        let path = expand_path(raw, &self.root);
        if !path.is_dir() {
            return Err(MboxError::InvalidLocalPath {
                path: path.display().to_string(),
            });
        }
        Ok(Dependency {
            path: Some(path.display().to_string()),
            ..Dependency::default()
        })
    }

    fn resolve_version(
        &self,
        dependency: &Dependency,
        created_repo: Option<&RepoConfig>,
    ) -> Option<Dependency> {
        let name = dependency.name.as_deref()?;
        let url = created_repo
            .and_then(|repo| repo.url.clone())
            .or_else(|| dependency.git.clone());
        let version = dependency.version.as_deref();

        let mut last = None;
        for engine in &self.engines {
            let mut found = match engine.resolve_dependency(name, version, url.as_deref()) {
                Ok(Some(found)) if found.git_pointer().is_some() => found,
                Ok(_) => continue,
                Err(e) => {
                    debug!("Resolve `{name}` in {} failed: {e:#}", engine.name());
                    continue;
                }
            };
            if let (Some(expected), Some(actual)) = (url.as_deref(), found.git.as_deref()) {
                if !git_urls_match(expected, actual) {
                    warn!("[{name}] Skip {} result: git url `{actual}` conflicts with `{expected}`", engine.name());
                    continue;
                }
            }
            if found.name.is_none() {
                found.name = Some(name.to_string());
            }
            if found.date.is_none() {
                found.date = engine.release_date(name, version).ok().flatten();
            }
            if found.date.is_some() {
                return Some(found);
            }
            last = Some(found);
        }

        if last.is_none() {
            debug!("No release of `{name}` {}", version.unwrap_or("(latest)"));
        }
        last
    }

    /// Reduce resolved candidates to one canonical descriptor.
    ///
    /// Tag-only candidates get the commit their tag points at before the
    /// commits are compared, so the date tie-break sees them too.
    pub fn reconcile(
        &self,
        mut candidates: Vec<Dependency>,
        git: Option<&dyn GitHistory>,
    ) -> Option<Dependency> {
        if let Some(local) = candidates.iter().find(|c| c.mode() == DependencyMode::Local) {
            return Some(local.clone());
        }
        if candidates.len() <= 1 {
            return candidates.pop();
        }

        if let Some(git) = git {
            match Self::latest_by_history(&mut candidates, git) {
                Ok(Some(commit)) => {
                    let mut canonical = candidates.swap_remove(0);
                    canonical.set_git_pointer(GitPointer::Commit(commit));
                    return Some(canonical);
                }
                Ok(None) => {}
                Err(e) => warn!("Git history is unavailable, falling back to release dates: {e:#}"),
            }
        }

        let newest = candidates
            .iter()
            .filter(|c| c.commit.is_some())
            .filter_map(|c| c.date.map(|date| (date, c)))
            .max_by_key(|(date, _)| *date)
            .and_then(|(_, c)| c.commit.clone());
        let mut canonical = candidates.swap_remove(0);
        if let Some(commit) = newest {
            canonical.set_git_pointer(GitPointer::Commit(commit));
        }
        Some(canonical)
    }

    /// Fill in the commits of tag-only candidates, then pick the commit
    /// every other one is an ancestor of.
    fn latest_by_history(candidates: &mut [Dependency], git: &dyn GitHistory) -> Result<Option<String>> {
        let mut tags: HashMap<String, String> = HashMap::new();
        for candidate in candidates.iter_mut().filter(|c| c.commit.is_none()) {
            let Some(tag) = candidate.tag.clone() else {
                continue;
            };
            let commit = match tags.get(&tag) {
                Some(commit) => commit.clone(),
                None => {
                    let commit = git.commit_for_tag(&tag)?;
                    tags.insert(tag, commit.clone());
                    commit
                }
            };
            candidate.commit = Some(commit);
        }

        let mut commits: Vec<String> = Vec::new();
        for commit in candidates.iter().filter_map(|c| c.commit.as_ref()) {
            if !commits.contains(commit) {
                commits.push(commit.clone());
            }
        }
        match commits.len() {
            0 => Ok(None),
            1 => Ok(commits.pop()),
            _ => git.latest_commit(&commits),
        }
    }
}
