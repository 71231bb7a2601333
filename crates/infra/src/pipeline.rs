//! The reconciliation pipeline.
//!
//! static source → normalize → registry overlay → merge with dynamic inventory.
//! Stages run strictly in sequence; any fatal error aborts with no partial result.

use std::path::Path;

use invsync_core::CanonicalInventory;
use invsync_inventory::{StaticSourceError, normalize_file};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::dynamic::{FetchError, fetch_dynamic_inventory};
use crate::overlay::{OverlayReport, apply_registry_overlay};
use crate::registry::{ConsulCatalog, RegistryError, ServiceRegistry};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("static inventory: {0}")]
    Static(#[from] StaticSourceError),

    #[error("dynamic inventory: {0}")]
    Fetch(#[from] FetchError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryPipeline {
    inventory: CanonicalInventory,
    overlay_report: OverlayReport,
}

impl InventoryPipeline {
    /// Load the config at `path` and run against it.
    pub fn from_config_file(path: &Path) -> Result<Self, PipelineError> {
        let config = Config::load(path)?;
        tracing::debug!(config = %path.display(), "config loaded");
        Self::run(&config)
    }

    /// Run against the registry named in `config`, if any.
    pub fn run(config: &Config) -> Result<Self, PipelineError> {
        match config.registry_url() {
            Some(url) => {
                let catalog = ConsulCatalog::new(url, config.consul.timeout())?;
                Self::run_with(config, Some(&catalog))
            }
            None => Self::run_with(config, None),
        }
    }

    /// Run with an explicit registry; `None` disables the overlay.
    pub fn run_with(
        config: &Config,
        registry: Option<&dyn ServiceRegistry>,
    ) -> Result<Self, PipelineError> {
        let mut inventory = match config.ansible.static_inventory_path.as_deref() {
            Some(path) => normalize_file(path)?,
            None => CanonicalInventory::new(),
        };

        let overlay_report = match registry {
            Some(registry) => apply_registry_overlay(&mut inventory, registry),
            None => OverlayReport::default(),
        };

        let dynamic = fetch_dynamic_inventory(config.ansible.dynamic_inventory_path.as_deref())?;
        let mut merged = inventory.merge(&dynamic);

        let added = merged.ensure_hostvars();
        if !added.is_empty() {
            tracing::debug!(hosts = ?added, "added empty hostvars for listed hosts");
        }

        tracing::info!(
            groups = merged.group_names().count(),
            hosts = merged.hostvars().map_or(0, |h| h.len()),
            replaced = overlay_report.replaced.len(),
            failed_lookups = overlay_report.failed.len(),
            "inventory reconciled"
        );
        Ok(Self {
            inventory: merged,
            overlay_report,
        })
    }

    /// The merged inventory.
    pub fn inventory(&self) -> &CanonicalInventory {
        &self.inventory
    }

    pub fn overlay_report(&self) -> &OverlayReport {
        &self.overlay_report
    }

    pub fn into_inventory(self) -> CanonicalInventory {
        self.inventory
    }
}
