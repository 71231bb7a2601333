//! Deep merge of nested variable mappings.
//!
//! The same rule applies at every level (group entries, `vars`, `_meta.hostvars`):
//!
//! - an empty `base`, or a `base` equal to `overlay`, yields a copy of `overlay`;
//! - otherwise keys from `overlay` are folded into a copy of `base`;
//! - a key whose existing and incoming values are both mappings is merged
//!   recursively, any other incoming value (scalar, list, null) replaces the old one.
//!
//! Lists are replaced, never concatenated. Neither input is mutated.

use serde_json::Value;

use crate::inventory::VariableMap;

/// Merge `overlay` into a copy of `base`; `overlay` wins on non-mapping conflicts.
///
/// Existing keys keep their position; keys only present in `overlay` are appended
/// in `overlay` order.
pub fn deep_merge(base: &VariableMap, overlay: &VariableMap) -> VariableMap {
    if base.is_empty() || base == overlay {
        return overlay.clone();
    }

    let mut result = base.clone();
    for (key, incoming) in overlay {
        let merged = match (result.get(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(deep_merge(existing, incoming))
            }
            _ => incoming.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}
