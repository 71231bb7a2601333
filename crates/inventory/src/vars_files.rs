//! `group_vars/` and `host_vars/` files next to the inventory source.
//!
//! For an entity `name`, any of these are read (in this order):
//! `<kind>/name`, `<kind>/name.yml`, `<kind>/name.yaml`, `<kind>/name.json`,
//! and every such file inside a `<kind>/name/` directory, by file name.
//! Later files replace top-level keys of earlier ones.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use invsync_core::VariableMap;

use crate::error::{StaticResult, StaticSourceError};
use crate::model::StaticInventory;

const EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarsFiles {
    groups: HashMap<String, VariableMap>,
    hosts: HashMap<String, VariableMap>,
}

impl VarsFiles {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read vars files under `dir` for every group and host of `inventory`.
    ///
    /// Missing `group_vars/` or `host_vars/` directories are not an error.
    pub fn load(dir: &Path, inventory: &StaticInventory) -> StaticResult<Self> {
        let mut files = Self::empty();

        let group_dir = dir.join("group_vars");
        if group_dir.is_dir() {
            for group in inventory.groups() {
                if let Some(vars) = read_entity(&group_dir, group.name())? {
                    files.groups.insert(group.name().to_string(), vars);
                }
            }
        }

        let host_dir = dir.join("host_vars");
        if host_dir.is_dir() {
            for host in inventory.hosts() {
                if let Some(vars) = read_entity(&host_dir, host.name())? {
                    files.hosts.insert(host.name().to_string(), vars);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            groups = files.groups.len(),
            hosts = files.hosts.len(),
            "loaded vars files"
        );
        Ok(files)
    }

    pub fn group(&self, name: &str) -> Option<&VariableMap> {
        self.groups.get(name)
    }

    pub fn host(&self, name: &str) -> Option<&VariableMap> {
        self.hosts.get(name)
    }

    pub fn set_group(&mut self, name: impl Into<String>, vars: VariableMap) {
        self.groups.insert(name.into(), vars);
    }

    pub fn set_host(&mut self, name: impl Into<String>, vars: VariableMap) {
        self.hosts.insert(name.into(), vars);
    }
}

fn read_entity(kind_dir: &Path, name: &str) -> StaticResult<Option<VariableMap>> {
    let mut candidates: Vec<PathBuf> = std::iter::once(kind_dir.join(name))
        .chain(EXTENSIONS.iter().map(|ext| kind_dir.join(format!("{name}.{ext}"))))
        .filter(|path| path.is_file())
        .collect();

    let nested = kind_dir.join(name);
    if nested.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(&nested)
            .map_err(|source| StaticSourceError::Read {
                path: nested.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_vars_extension(path))
            .collect();
        entries.sort();
        candidates.extend(entries);
    }

    if candidates.is_empty() {
        return Ok(None);
    }

    let mut vars = VariableMap::new();
    for path in candidates {
        vars.extend(read_vars_file(&path)?);
    }
    Ok(Some(vars))
}

fn has_vars_extension(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => EXTENSIONS.contains(&ext),
    }
}

fn read_vars_file(path: &Path) -> StaticResult<VariableMap> {
    let text = fs::read_to_string(path).map_err(|source| StaticSourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(VariableMap::new());
    }

    let value: Value = serde_yaml::from_str(&text).map_err(|e| StaticSourceError::VarsFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Null => Ok(VariableMap::new()),
        Value::Object(vars) => Ok(vars),
        _ => Err(StaticSourceError::VarsFile {
            path: path.to_path_buf(),
            message: "expected a mapping of variables".to_string(),
        }),
    }
}
