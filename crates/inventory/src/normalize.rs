//! Static inventory → canonical inventory.

use std::path::Path;

use invsync_core::{CanonicalInventory, GroupEntry, VariableMap};

use crate::error::StaticResult;
use crate::model::StaticInventory;
use crate::resolver::{BOOKKEEPING_KEYS, LayeredResolver, VarResolver};
use crate::vars_files::VarsFiles;

/// Convert `inventory` into the canonical shape.
///
/// Every group gets an entry; `hosts`, `vars` and `children` are only set when
/// non-empty. Every host gets a `_meta.hostvars` entry with its resolved
/// variables minus the resolver's bookkeeping keys.
pub fn normalize(inventory: &StaticInventory, resolver: &dyn VarResolver) -> CanonicalInventory {
    let mut canonical = CanonicalInventory::new();

    for group in inventory.groups() {
        let mut entry = GroupEntry::default();
        if !group.hosts().is_empty() {
            entry = entry.with_hosts(group.hosts().to_vec());
        }
        let vars = resolver.resolve_group_vars(group.name());
        if !vars.is_empty() {
            entry = entry.with_vars(vars);
        }
        if !group.children().is_empty() {
            entry = entry.with_children(group.children().to_vec());
        }
        canonical.insert_group(group.name(), entry);
    }

    for host in inventory.hosts() {
        let vars = strip_bookkeeping(resolver.resolve_host_vars(host.name()));
        canonical.insert_host_vars(host.name(), vars);
    }
    canonical.ensure_hostvars();

    tracing::debug!(
        groups = inventory.groups().count(),
        hosts = inventory.hosts().count(),
        "normalized static inventory"
    );
    canonical
}

/// Load the static inventory at `path`, with its vars files, and normalize it.
pub fn normalize_file(path: &Path) -> StaticResult<CanonicalInventory> {
    let inventory = StaticInventory::load(path)?;
    let vars_files = match inventory.source_dir() {
        Some(dir) => VarsFiles::load(dir, &inventory)?,
        None => VarsFiles::empty(),
    };
    let resolver = LayeredResolver::new(&inventory, &vars_files);
    Ok(normalize(&inventory, &resolver))
}

fn strip_bookkeeping(mut vars: VariableMap) -> VariableMap {
    for key in BOOKKEEPING_KEYS {
        vars.remove(key);
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// Resolver with fixed answers, bookkeeping keys included.
    struct FixedResolver;

    impl VarResolver for FixedResolver {
        fn resolve_host_vars(&self, host: &str) -> VariableMap {
            json!({
                "inventory_hostname": host,
                "groups": {"all": [host]},
                "inventory_dir": "/x",
                "inventory_file": "/x/hosts",
                "omit": "__omit__",
            })
            .as_object()
            .cloned()
            .unwrap()
        }

        fn resolve_group_vars(&self, group: &str) -> VariableMap {
            if group == "db" {
                json!({"engine": "pg"}).as_object().cloned().unwrap()
            } else {
                VariableMap::new()
            }
        }
    }

    fn static_inventory() -> StaticInventory {
        let mut inv = StaticInventory::new();
        inv.add_host("db", "db1");
        inv.add_child("prod", "db").unwrap();
        inv.reconcile();
        inv
    }

    #[test]
    fn fields_are_only_set_when_present() {
        let canonical = normalize(&static_inventory(), &FixedResolver);

        assert_eq!(
            Value::from(canonical),
            json!({
                "all": {"children": ["ungrouped", "prod"]},
                "ungrouped": {},
                "db": {"hosts": ["db1"], "vars": {"engine": "pg"}},
                "prod": {"children": ["db"]},
                "_meta": {"hostvars": {"db1": {"inventory_hostname": "db1"}}}
            })
        );
    }

    #[test]
    fn empty_inventory_still_has_meta() {
        let canonical = normalize(&StaticInventory::new(), &FixedResolver);
        assert!(canonical.hostvars().unwrap().is_empty());
    }

    #[test]
    fn loads_file_with_vars_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.ini");
        std::fs::write(&path, "[web]\nw1 port=80\n").unwrap();
        std::fs::create_dir(dir.path().join("group_vars")).unwrap();
        std::fs::write(dir.path().join("group_vars/web.yml"), "tls: true\n").unwrap();

        let canonical = normalize_file(&path).unwrap();

        assert_eq!(canonical.group("web").unwrap().hosts.unwrap(), ["w1"]);
        assert_eq!(canonical.group("web").unwrap().vars.unwrap()["tls"], json!(true));
        let w1 = canonical.host_vars("w1").unwrap();
        assert_eq!(w1["port"], json!(80));
        assert_eq!(w1["tls"], json!(true));
        assert_eq!(w1["group_names"], json!(["web"]));
        assert!(!w1.contains_key("groups"));
        assert!(!w1.contains_key("omit"));
    }
}
