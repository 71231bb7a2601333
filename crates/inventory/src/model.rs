//! Hierarchical static inventory: groups, hosts, child links and variables.
//!
//! Groups and hosts are kept in declaration order. Two groups always exist:
//! `all` (root of the hierarchy) and `ungrouped` (hosts with no other group).
//! Call [`StaticInventory::reconcile`] once loading is done to attach orphan
//! groups to `all` and to settle `ungrouped` membership.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use invsync_core::VariableMap;

use crate::error::{StaticResult, StaticSourceError};

pub const ALL_GROUP: &str = "all";
pub const UNGROUPED_GROUP: &str = "ungrouped";

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    hosts: Vec<String>,
    children: Vec<String>,
    parents: Vec<String>,
    vars: VariableMap,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hosts: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
            vars: VariableMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hosts added directly to this group (not via children).
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Variables declared for this group in the inventory source.
    pub fn vars(&self) -> &VariableMap {
        &self.vars
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    name: String,
    vars: VariableMap,
    groups: Vec<String>,
}

impl Host {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: VariableMap::new(),
            groups: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variables declared for this host in the inventory source.
    pub fn vars(&self) -> &VariableMap {
        &self.vars
    }

    /// Groups this host was added to directly.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticInventory {
    source: Option<PathBuf>,
    groups: IndexMap<String, Group>,
    hosts: IndexMap<String, Host>,
}

impl Default for StaticInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticInventory {
    pub fn new() -> Self {
        let mut inventory = Self {
            source: None,
            groups: IndexMap::new(),
            hosts: IndexMap::new(),
        };
        inventory.add_group(ALL_GROUP);
        inventory.add_group(UNGROUPED_GROUP);
        inventory.link(ALL_GROUP, UNGROUPED_GROUP);
        inventory
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// File the inventory was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Directory holding the inventory source (where `group_vars/` live).
    pub fn source_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    /// Add a group if it does not exist yet.
    pub fn add_group(&mut self, name: &str) {
        if !self.groups.contains_key(name) {
            self.groups.insert(name.to_string(), Group::new(name));
        }
    }

    /// Add `host` to `group`, creating either if needed.
    pub fn add_host(&mut self, group: &str, host: &str) {
        self.add_group(group);
        let host_entry = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| Host::new(host));
        if !host_entry.groups.iter().any(|g| g == group) {
            host_entry.groups.push(group.to_string());
        }

        if let Some(group_entry) = self.groups.get_mut(group) {
            if !group_entry.hosts.iter().any(|h| h == host) {
                group_entry.hosts.push(host.to_string());
            }
        }
    }

    /// Make `child` a child group of `parent`, creating either if needed.
    ///
    /// Rejects links that would make a group its own ancestor. `all` is the
    /// root of every hierarchy and can never be a child.
    pub fn add_child(&mut self, parent: &str, child: &str) -> StaticResult<()> {
        if parent == child
            || child == ALL_GROUP
            || self.ancestors(parent).iter().any(|a| a == child)
        {
            return Err(StaticSourceError::Cycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        self.add_group(parent);
        self.add_group(child);
        self.link(parent, child);
        Ok(())
    }

    pub fn set_group_var(&mut self, group: &str, key: impl Into<String>, value: Value) {
        self.add_group(group);
        if let Some(entry) = self.groups.get_mut(group) {
            entry.vars.insert(key.into(), value);
        }
    }

    /// Set a variable on an existing host; unknown hosts are ignored.
    pub fn set_host_var(&mut self, host: &str, key: impl Into<String>, value: Value) {
        if let Some(entry) = self.hosts.get_mut(host) {
            entry.vars.insert(key.into(), value);
        }
    }

    /// Settle the implicit hierarchy after loading.
    ///
    /// Groups without a parent become children of `all`. Hosts that belong to a
    /// real group leave `ungrouped`; hosts that belong to none join it.
    pub fn reconcile(&mut self) {
        let orphans: Vec<String> = self
            .groups
            .values()
            .filter(|g| g.name != ALL_GROUP && g.parents.is_empty())
            .map(|g| g.name.clone())
            .collect();
        for orphan in orphans {
            self.link(ALL_GROUP, &orphan);
        }

        let host_names: Vec<String> = self.hosts.keys().cloned().collect();
        for host in host_names {
            let (in_real_group, in_ungrouped) = match self.hosts.get(&host) {
                Some(entry) => (
                    entry
                        .groups
                        .iter()
                        .any(|g| g != ALL_GROUP && g != UNGROUPED_GROUP),
                    entry.groups.iter().any(|g| g == UNGROUPED_GROUP),
                ),
                None => continue,
            };

            if in_real_group && in_ungrouped {
                self.remove_from_group(UNGROUPED_GROUP, &host);
            } else if !in_real_group && !in_ungrouped {
                self.add_host(UNGROUPED_GROUP, &host);
            }
        }
    }

    /// Distance from `all`: `0` for `all`, longest parent chain otherwise.
    pub fn depth(&self, group: &str) -> usize {
        self.depth_along(group, &mut Vec::new())
    }

    /// `path` holds the groups on the current chain; revisiting one stops the walk.
    fn depth_along<'a>(&'a self, group: &'a str, path: &mut Vec<&'a str>) -> usize {
        if path.contains(&group) {
            return 0;
        }
        let Some(entry) = self.groups.get(group) else {
            return 0;
        };

        path.push(group);
        let depth = entry
            .parents
            .iter()
            .map(|p| 1 + self.depth_along(p, path))
            .max()
            .unwrap_or(0);
        path.pop();
        depth
    }

    /// All transitive parents of `group`, nearest first, without duplicates.
    pub fn ancestors(&self, group: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = vec![group];
        while let Some(current) = pending.pop() {
            let Some(entry) = self.groups.get(current) else {
                continue;
            };
            for parent in &entry.parents {
                if !found.contains(parent) {
                    found.push(parent.clone());
                    pending.push(parent);
                }
            }
        }
        found
    }

    /// Every group `host` belongs to, directly or through a parent group.
    pub fn host_groups(&self, host: &str) -> Vec<String> {
        let Some(entry) = self.hosts.get(host) else {
            return Vec::new();
        };
        let mut groups: Vec<String> = Vec::new();
        for direct in &entry.groups {
            for name in std::iter::once(direct.clone()).chain(self.ancestors(direct)) {
                if !groups.contains(&name) {
                    groups.push(name);
                }
            }
        }
        groups
    }

    /// Hosts of `group` and of all its descendants, in discovery order.
    pub fn hosts_under(&self, group: &str) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        let mut visited: Vec<&str> = Vec::new();
        let mut pending: Vec<&str> = vec![group];
        while let Some(current) = pending.pop() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);
            let Some(entry) = self.groups.get(current) else {
                continue;
            };
            for host in &entry.hosts {
                if !hosts.contains(host) {
                    hosts.push(host.clone());
                }
            }
            pending.extend(entry.children.iter().rev().map(String::as_str));
        }
        hosts
    }

    fn link(&mut self, parent: &str, child: &str) {
        if let Some(entry) = self.groups.get_mut(parent) {
            if !entry.children.iter().any(|c| c == child) {
                entry.children.push(child.to_string());
            }
        }
        if let Some(entry) = self.groups.get_mut(child) {
            if !entry.parents.iter().any(|p| p == parent) {
                entry.parents.push(parent.to_string());
            }
        }
    }

    fn remove_from_group(&mut self, group: &str, host: &str) {
        if let Some(entry) = self.groups.get_mut(group) {
            entry.hosts.retain(|h| h != host);
        }
        if let Some(entry) = self.hosts.get_mut(host) {
            entry.groups.retain(|g| g != group);
        }
    }
}
