//! Canonical inventory document.
//!
//! The canonical shape is the one Ansible's dynamic-inventory protocol uses:
//!
//! ```text
//! {
//!   "<group>": { "hosts": [..], "vars": {..}, "children": [..] },
//!   "_meta": { "hostvars": { "<host>": {..} } }
//! }
//! ```
//!
//! The document is kept as an ordered JSON mapping rather than a fully typed
//! struct so that the merge stays a generic nested-mapping merge and keys a
//! dynamic script emits survive untouched. [`GroupEntry`] is the typed view of a
//! single group.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InventoryError, InventoryResult, kind_of};
use crate::merge::deep_merge;

/// Ordered string-keyed mapping of variables (arbitrarily nested).
pub type VariableMap = serde_json::Map<String, Value>;

/// Reserved top-level key holding per-host variables.
pub const META_KEY: &str = "_meta";

/// Key inside `_meta` mapping host names to their variables.
pub const HOSTVARS_KEY: &str = "hostvars";

/// Typed view of a group entry.
///
/// A `None` field means "not applicable", which is distinct from an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<VariableMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

impl GroupEntry {
    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = Some(hosts);
        self
    }

    pub fn with_vars(mut self, vars: VariableMap) -> Self {
        self.vars = Some(vars);
        self
    }

    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = Some(children);
        self
    }

    /// Read a group entry leniently from a document value.
    ///
    /// Non-string host or child names are rendered with their JSON text; fields of
    /// an unexpected kind are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let names = |key: &str| {
            value.get(key).and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<String>>()
            })
        };

        Self {
            hosts: names("hosts"),
            vars: value.get("vars").and_then(Value::as_object).cloned(),
            children: names("children"),
        }
    }

    fn into_value(self) -> Value {
        let mut entry = VariableMap::new();
        if let Some(hosts) = self.hosts {
            entry.insert("hosts".into(), strings(hosts));
        }
        if let Some(vars) = self.vars {
            entry.insert("vars".into(), Value::Object(vars));
        }
        if let Some(children) = self.children {
            entry.insert("children".into(), strings(children));
        }
        Value::Object(entry)
    }
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Merged inventory document: groups plus `_meta.hostvars`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalInventory(VariableMap);

impl CanonicalInventory {
    /// Empty inventory: no groups, no `_meta`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed JSON document.
    ///
    /// A group given as a bare list of hosts is normalized to `{"hosts": [..]}`.
    pub fn from_value(value: Value) -> InventoryResult<Self> {
        let Value::Object(document) = value else {
            return Err(InventoryError::NotAMapping(kind_of(&value)));
        };

        let mut normalized = VariableMap::new();
        for (name, entry) in document {
            let entry = if name == META_KEY {
                validate_meta(&entry)?;
                entry
            } else {
                match entry {
                    Value::Object(_) => entry,
                    Value::Array(hosts) => {
                        let mut group = VariableMap::new();
                        group.insert("hosts".into(), Value::Array(hosts));
                        Value::Object(group)
                    }
                    other => return Err(InventoryError::invalid_group(name, kind_of(&other))),
                }
            };
            normalized.insert(name, entry);
        }
        Ok(Self(normalized))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &VariableMap {
        &self.0
    }

    pub fn into_map(self) -> VariableMap {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Group names in document order, `_meta` excluded.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|name| *name != META_KEY)
    }

    /// Groups in document order with their typed entries, `_meta` excluded.
    pub fn groups(&self) -> impl Iterator<Item = (&str, GroupEntry)> {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != META_KEY)
            .map(|(name, entry)| (name.as_str(), GroupEntry::from_value(entry)))
    }

    pub fn group(&self, name: &str) -> Option<GroupEntry> {
        if name == META_KEY {
            return None;
        }
        self.0.get(name).map(GroupEntry::from_value)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        name != META_KEY && self.0.contains_key(name)
    }

    /// Insert or replace a whole group entry.
    pub fn insert_group(&mut self, name: impl Into<String>, entry: GroupEntry) {
        self.0.insert(name.into(), entry.into_value());
    }

    /// Replace a group's host list, keeping its other fields.
    ///
    /// Returns `false` if the group does not exist or is not a mapping.
    pub fn set_hosts(&mut self, group: &str, hosts: Vec<String>) -> bool {
        if group == META_KEY {
            return false;
        }
        match self.0.get_mut(group) {
            Some(Value::Object(entry)) => {
                entry.insert("hosts".into(), strings(hosts));
                true
            }
            _ => false,
        }
    }

    /// The `_meta.hostvars` mapping, if present.
    pub fn hostvars(&self) -> Option<&VariableMap> {
        self.0
            .get(META_KEY)
            .and_then(|meta| meta.get(HOSTVARS_KEY))
            .and_then(Value::as_object)
    }

    pub fn host_vars(&self, host: &str) -> Option<&VariableMap> {
        self.hostvars()
            .and_then(|hostvars| hostvars.get(host))
            .and_then(Value::as_object)
    }

    /// Store a host's variables under `_meta.hostvars`, creating `_meta` if needed.
    pub fn insert_host_vars(&mut self, host: impl Into<String>, vars: VariableMap) {
        self.hostvars_mut().insert(host.into(), Value::Object(vars));
    }

    /// Make sure every host listed by a group has a `_meta.hostvars` entry.
    ///
    /// Missing entries are added as empty mappings; `_meta.hostvars` itself is
    /// always present afterwards. Returns the names that were added.
    pub fn ensure_hostvars(&mut self) -> Vec<String> {
        let listed: Vec<String> = self
            .groups()
            .filter_map(|(_, entry)| entry.hosts)
            .flatten()
            .collect();

        let hostvars = self.hostvars_mut();
        let mut added = Vec::new();
        for host in listed {
            if !hostvars.contains_key(&host) {
                hostvars.insert(host.clone(), Value::Object(VariableMap::new()));
                added.push(host);
            }
        }
        added
    }

    /// Deep-merge `overlay` on top of `self`; see [`crate::merge::deep_merge`].
    pub fn merge(&self, overlay: &CanonicalInventory) -> CanonicalInventory {
        Self(deep_merge(&self.0, &overlay.0))
    }

    fn hostvars_mut(&mut self) -> &mut VariableMap {
        let meta = mapping_slot(
            self.0
                .entry(META_KEY)
                .or_insert_with(|| Value::Object(VariableMap::new())),
        );
        mapping_slot(
            meta.entry(HOSTVARS_KEY)
                .or_insert_with(|| Value::Object(VariableMap::new())),
        )
    }
}

/// Borrow `slot` as a mapping, resetting it first if it holds anything else.
fn mapping_slot(slot: &mut Value) -> &mut VariableMap {
    if !slot.is_object() {
        *slot = Value::Object(VariableMap::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just reset to a mapping"),
    }
}

impl From<CanonicalInventory> for Value {
    fn from(value: CanonicalInventory) -> Self {
        value.into_value()
    }
}

fn validate_meta(meta: &Value) -> InventoryResult<()> {
    let Value::Object(meta) = meta else {
        return Err(InventoryError::invalid_meta(format!(
            "expected a mapping, found {}",
            kind_of(meta)
        )));
    };
    match meta.get(HOSTVARS_KEY) {
        None | Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(InventoryError::invalid_meta(format!(
            "`hostvars` must be a mapping, found {}",
            kind_of(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inventory(value: Value) -> CanonicalInventory {
        CanonicalInventory::from_value(value).unwrap()
    }

    #[test]
    fn group_entry_omits_absent_fields() {
        let mut inv = CanonicalInventory::new();
        inv.insert_group("db", GroupEntry::default().with_hosts(vec!["db1".into()]));

        assert_eq!(inv.into_value(), json!({"db": {"hosts": ["db1"]}}));
    }

    #[test]
    fn host_list_shorthand_is_normalized() {
        let inv = inventory(json!({"web": ["a", "b"]}));

        assert_eq!(
            inv.group("web"),
            Some(GroupEntry::default().with_hosts(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn scalar_group_is_rejected() {
        let err = CanonicalInventory::from_value(json!({"web": 3})).unwrap_err();
        assert_eq!(err, InventoryError::invalid_group("web", "a number"));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = CanonicalInventory::from_value(json!(["web"])).unwrap_err();
        assert_eq!(err, InventoryError::NotAMapping("a list"));
    }

    #[test]
    fn malformed_meta_is_rejected() {
        let err = CanonicalInventory::from_value(json!({"_meta": {"hostvars": []}})).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidMeta(_)));
    }

    #[test]
    fn meta_is_not_a_group() {
        let inv = inventory(json!({
            "web": {"hosts": ["a"]},
            "_meta": {"hostvars": {"a": {"port": 80}}}
        }));

        assert_eq!(inv.group_names().collect::<Vec<_>>(), ["web"]);
        assert_eq!(inv.group(META_KEY), None);
        assert!(!inv.contains_group(META_KEY));
        assert_eq!(inv.host_vars("a").unwrap()["port"], json!(80));
    }

    #[test]
    fn set_hosts_keeps_other_fields() {
        let mut inv = inventory(json!({"web": {"hosts": ["a"], "vars": {"x": 1}}}));

        assert!(inv.set_hosts("web", vec!["10.0.0.1".into()]));
        assert!(!inv.set_hosts("missing", vec![]));
        assert!(!inv.set_hosts(META_KEY, vec![]));

        assert_eq!(
            inv.into_value(),
            json!({"web": {"hosts": ["10.0.0.1"], "vars": {"x": 1}}})
        );
    }

    #[test]
    fn ensure_hostvars_fills_missing_entries_only() {
        let mut inv = inventory(json!({
            "web": {"hosts": ["a", "b"]},
            "db": {"hosts": ["b", "c"]},
            "_meta": {"hostvars": {"a": {"x": 1}}}
        }));

        let added = inv.ensure_hostvars();

        assert_eq!(added, ["b", "c"]);
        assert_eq!(inv.host_vars("a").unwrap()["x"], json!(1));
        assert!(inv.host_vars("c").unwrap().is_empty());
    }

    #[test]
    fn ensure_hostvars_creates_meta() {
        let mut inv = CanonicalInventory::new();
        inv.ensure_hostvars();
        assert_eq!(inv.into_value(), json!({"_meta": {"hostvars": {}}}));
    }

    #[test]
    fn static_and_dynamic_entries_combine() {
        let static_inv = inventory(json!({
            "db": {"hosts": ["db1"]},
            "_meta": {"hostvars": {"db1": {}}}
        }));
        let dynamic_inv = inventory(json!({"db": {"vars": {"role": "primary"}}}));

        let merged = static_inv.merge(&dynamic_inv);

        assert_eq!(
            merged.group("db"),
            Some(
                GroupEntry::default()
                    .with_hosts(vec!["db1".into()])
                    .with_vars(json!({"role": "primary"}).as_object().cloned().unwrap())
            )
        );
    }

    #[test]
    fn serializes_transparently() {
        let inv = inventory(json!({"web": {"children": ["api"]}}));
        let text = serde_json::to_string(&inv).unwrap();
        assert_eq!(text, r#"{"web":{"children":["api"]}}"#);

        let back: CanonicalInventory = serde_json::from_str(&text).unwrap();
        assert_eq!(back, inv);
    }
}
