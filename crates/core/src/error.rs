//! Inventory document error model.

use thiserror::Error;

/// Result type used by the canonical inventory model.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// A document could not be read as a canonical inventory.
///
/// Only the shape needed to merge and render is checked; group contents are
/// otherwise carried as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The top-level document was not a mapping.
    #[error("inventory document must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// A group value was neither a mapping nor a host list.
    #[error("group `{group}` must be a mapping or a list of hosts, found {found}")]
    InvalidGroup { group: String, found: &'static str },

    /// The reserved `_meta` entry was malformed.
    #[error("invalid `_meta` entry: {0}")]
    InvalidMeta(String),
}

impl InventoryError {
    pub fn invalid_group(group: impl Into<String>, found: &'static str) -> Self {
        Self::InvalidGroup {
            group: group.into(),
            found,
        }
    }

    pub fn invalid_meta(msg: impl Into<String>) -> Self {
        Self::InvalidMeta(msg.into())
    }
}

/// Short name of a JSON value's kind, for diagnostics.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
