//! Reading a static inventory from disk.

use std::fs;
use std::path::Path;

use crate::error::{StaticResult, StaticSourceError};
use crate::ini::parse_ini;
use crate::model::StaticInventory;
use crate::yaml::parse_yaml;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Ini,
    Yaml,
}

impl SourceFormat {
    /// `.yml`, `.yaml` and `.json` are YAML; everything else is INI.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml" | "json") => Self::Yaml,
            _ => Self::Ini,
        }
    }
}

impl StaticInventory {
    /// Load and reconcile the inventory file at `path`.
    pub fn load(path: &Path) -> StaticResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| StaticSourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let format = SourceFormat::from_path(path);
        tracing::debug!(path = %path.display(), ?format, "loading static inventory");

        let inventory = Self::parse(&text, format)
            .map_err(|e| StaticSourceError::in_file(path, e))?
            .with_source(path);
        Ok(inventory)
    }

    /// Parse and reconcile inventory text.
    pub fn parse(text: &str, format: SourceFormat) -> StaticResult<Self> {
        let mut inventory = Self::new();
        match format {
            SourceFormat::Ini => parse_ini(text, &mut inventory)?,
            SourceFormat::Yaml => parse_yaml(text, &mut inventory)?,
        }
        inventory.reconcile();
        Ok(inventory)
    }
}
