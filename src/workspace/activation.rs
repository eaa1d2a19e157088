//! Component activation state of a repo.
//!
//! Absence of a record for a tool means every component of that tool is
//! active; the catalog is needed to spell that default out as names.
//! Activating everything therefore deletes the record instead of filling it.
//! None of these operations fail: lookups that find nothing are no-ops.

use tracing::info;

use super::catalog::{Component, WorkRepo};
use super::config::{ComponentActivation, RepoConfig};
use crate::core::DependencyTool;

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

fn dedup_names(names: &mut Vec<String>) {
    let mut unique = Vec::with_capacity(names.len());
    for name in names.iter() {
        push_unique(&mut unique, name);
    }
    *names = unique;
}

impl RepoConfig {
    #[must_use]
    pub fn activation(&self, tool: &DependencyTool) -> Option<&ComponentActivation> {
        self.components.iter().find(|c| &c.tool == tool)
    }

    /// Active component names for `tool`; every catalog name when no record exists.
    #[must_use]
    pub fn activated_components(&self, tool: &DependencyTool, catalog: &WorkRepo) -> Vec<String> {
        match self.activation(tool) {
            Some(record) => record.active.clone(),
            None => catalog.components_for(tool).iter().map(|c| c.name.clone()).collect(),
        }
    }

    #[must_use]
    pub fn is_active(&self, component: &Component) -> bool {
        self.activation(&component.tool)
            .is_none_or(|record| record.active.iter().any(|name| component.is_name(name)))
    }

    /// Whether `name` is active for `tool`, without a catalog entry at hand.
    #[must_use]
    pub fn is_name_active(&self, name: &str, tool: &DependencyTool) -> bool {
        self.activation(tool)
            .is_none_or(|record| record.active.iter().any(|n| n.eq_ignore_ascii_case(name)))
    }

    /// The record for `tool`, created when missing. A new record starts with
    /// the catalog defaults when `defaults` is given, empty otherwise.
    fn fetch_activation(
        &mut self,
        tool: &DependencyTool,
        defaults: Option<&WorkRepo>,
    ) -> &mut ComponentActivation {
        let index = match self.components.iter().position(|c| &c.tool == tool) {
            Some(index) => index,
            None => {
                let mut record = ComponentActivation::new(tool.clone());
                if let Some(catalog) = defaults {
                    record.active = catalog.components_for(tool).iter().map(|c| c.name.clone()).collect();
                }
                self.components.push(record);
                self.components.len() - 1
            }
        };
        &mut self.components[index]
    }

    pub fn activate_component(&mut self, component: &Component, catalog: &WorkRepo) {
        info!("[{}] Activate component `{}` for {}", self.name, component.name, component.tool);
        let record = self.fetch_activation(&component.tool, Some(catalog));
        push_unique(&mut record.active, &component.name);
    }

    /// Activate the catalog components matching `names`.
    ///
    /// `override_list` replaces the record with exactly these components;
    /// otherwise they are appended to the current (or default) list. Returns
    /// `false` without touching anything when no name resolves.
    pub fn activate_components(
        &mut self,
        names: &[String],
        tool: &DependencyTool,
        override_list: bool,
        catalog: &WorkRepo,
    ) -> bool {
        let resolved: Vec<String> = catalog
            .fetch_components(names, tool)
            .into_iter()
            .map(|c| c.name.clone())
            .collect();
        if resolved.is_empty() {
            return false;
        }

        let listing = resolved.iter().map(|n| format!("`{n}`")).collect::<Vec<_>>().join(", ");
        let repo_name = self.name.clone();
        let record = self.fetch_activation(tool, (!override_list).then_some(catalog));
        if override_list {
            info!("[{repo_name}] (Override) Activate components {listing} for {tool}");
            record.active = resolved;
        } else {
            info!("[{repo_name}] (Append) Activate components {listing} for {tool}");
            record.active.extend(resolved);
        }
        dedup_names(&mut record.active);
        true
    }

    pub fn deactivate_component(&mut self, component: &Component, catalog: &WorkRepo) {
        info!("[{}] Deactivate component `{}` for {}", self.name, component.name, component.tool);
        let record = self.fetch_activation(&component.tool, Some(catalog));
        record.active.retain(|n| !component.is_name(n));
    }

    /// Delete the records of `tools`, making every component active.
    pub fn activate_all(&mut self, tools: &[DependencyTool]) {
        for tool in tools {
            info!("[{}] Activate all components for {tool}", self.name);
            self.components.retain(|c| &c.tool != tool);
        }
    }

    /// Empty the records of `tools`, creating them as needed.
    pub fn deactivate_all(&mut self, tools: &[DependencyTool]) {
        for tool in tools {
            info!("[{}] Deactivate all components for {tool}", self.name);
            self.fetch_activation(tool, None).active.clear();
        }
    }
}
