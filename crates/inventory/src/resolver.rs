//! Host and group variable resolution.
//!
//! [`VarResolver`] is the seam the normalizer depends on. [`LayeredResolver`]
//! implements Ansible's layering, lowest precedence first:
//!
//! 1. inventory group vars, groups ordered by (depth, name)
//! 2. `group_vars/` files, same order (`all` first)
//! 3. inventory host vars
//! 4. `host_vars/` file
//! 5. magic variables
//!
//! Layers replace top-level keys; nested mappings are not merged.

use serde_json::Value;

use invsync_core::VariableMap;

use crate::model::{ALL_GROUP, StaticInventory};
use crate::vars_files::VarsFiles;

/// Keys the resolver adds for its own bookkeeping; not inventory data.
pub const BOOKKEEPING_KEYS: [&str; 4] = ["groups", "inventory_dir", "inventory_file", "omit"];

/// Placeholder value of the `omit` magic variable.
pub const OMIT_PLACEHOLDER: &str = "__omit_place_holder__";

pub trait VarResolver {
    /// Fully resolved variables of `host`; empty for unknown hosts.
    fn resolve_host_vars(&self, host: &str) -> VariableMap;

    /// Variables that apply to `group` itself.
    fn resolve_group_vars(&self, group: &str) -> VariableMap;
}

pub struct LayeredResolver<'a> {
    inventory: &'a StaticInventory,
    vars_files: &'a VarsFiles,
    /// The `groups` magic variable, identical for every host.
    group_members: Value,
}

impl<'a> LayeredResolver<'a> {
    pub fn new(inventory: &'a StaticInventory, vars_files: &'a VarsFiles) -> Self {
        let group_members = inventory
            .groups()
            .map(|group| {
                let name = group.name();
                (name.to_string(), Value::from(inventory.hosts_under(name)))
            })
            .collect::<VariableMap>();
        Self {
            inventory,
            vars_files,
            group_members: Value::Object(group_members),
        }
    }

    fn sorted_groups(&self, host: &str) -> Vec<String> {
        let mut groups = self.inventory.host_groups(host);
        groups.sort_by(|a, b| {
            self.inventory
                .depth(a)
                .cmp(&self.inventory.depth(b))
                .then_with(|| a.cmp(b))
        });
        groups
    }

    fn magic_vars(&self, host: &str, groups: &[String]) -> VariableMap {
        let mut magic = VariableMap::new();
        magic.insert("inventory_hostname".into(), Value::from(host));
        let short = host.split('.').next().unwrap_or(host);
        magic.insert("inventory_hostname_short".into(), Value::from(short));

        let mut group_names: Vec<&str> = groups
            .iter()
            .map(String::as_str)
            .filter(|g| *g != ALL_GROUP)
            .collect();
        group_names.sort_unstable();
        magic.insert("group_names".into(), Value::from(group_names));

        magic.insert("groups".into(), self.group_members.clone());

        let path_value = |path: Option<&std::path::Path>| {
            path.map_or(Value::Null, |p| Value::from(p.display().to_string()))
        };
        magic.insert("inventory_file".into(), path_value(self.inventory.source()));
        magic.insert("inventory_dir".into(), path_value(self.inventory.source_dir()));
        magic.insert("omit".into(), Value::from(OMIT_PLACEHOLDER));
        magic
    }
}

impl VarResolver for LayeredResolver<'_> {
    fn resolve_host_vars(&self, host: &str) -> VariableMap {
        let Some(entry) = self.inventory.host(host) else {
            return VariableMap::new();
        };
        let groups = self.sorted_groups(host);

        let mut vars = VariableMap::new();
        for group in &groups {
            if let Some(group) = self.inventory.group(group) {
                layer(&mut vars, group.vars());
            }
        }
        for group in &groups {
            if let Some(file_vars) = self.vars_files.group(group) {
                layer(&mut vars, file_vars);
            }
        }
        layer(&mut vars, entry.vars());
        if let Some(file_vars) = self.vars_files.host(host) {
            layer(&mut vars, file_vars);
        }
        layer(&mut vars, &self.magic_vars(host, &groups));
        vars
    }

    fn resolve_group_vars(&self, group: &str) -> VariableMap {
        let mut vars = VariableMap::new();
        if let Some(entry) = self.inventory.group(group) {
            layer(&mut vars, entry.vars());
        }
        if let Some(file_vars) = self.vars_files.group(group) {
            layer(&mut vars, file_vars);
        }
        vars
    }
}

fn layer(vars: &mut VariableMap, upper: &VariableMap) {
    for (key, value) in upper {
        vars.insert(key.clone(), value.clone());
    }
}
