//! Registry overlay: live addresses replace static host lists.

use std::time::Duration;

use invsync_core::CanonicalInventory;

use crate::registry::{ConsulCatalog, RegistryError, ServiceRegistry};

/// What an overlay pass did, group by group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Groups whose host list was replaced.
    pub replaced: Vec<String>,
    /// Groups the registry knows nothing about.
    pub unmatched: Vec<String>,
    /// Groups whose lookup failed; their hosts are left as they were.
    pub failed: Vec<String>,
}

impl OverlayReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Query `registry` once per group, in document order, and replace the host
/// list of every group that has at least one registered instance.
///
/// `_meta` is never looked up. Lookup failures are logged and counted but
/// never abort the pass.
pub fn apply_registry_overlay(
    inventory: &mut CanonicalInventory,
    registry: &dyn ServiceRegistry,
) -> OverlayReport {
    let groups: Vec<String> = inventory.group_names().map(str::to_string).collect();
    let mut report = OverlayReport::default();

    for group in groups {
        match registry.service_addresses(&group) {
            Ok(addresses) if addresses.is_empty() => report.unmatched.push(group),
            Ok(addresses) => {
                tracing::debug!(group = %group, count = addresses.len(), "replacing hosts from registry");
                if inventory.set_hosts(&group, addresses) {
                    report.replaced.push(group);
                } else {
                    tracing::warn!(group = %group, "group entry is not a mapping; hosts not replaced");
                    report.unmatched.push(group);
                }
            }
            Err(error) => {
                tracing::warn!(group = %group, error = %error, "registry lookup failed; keeping static hosts");
                report.failed.push(group);
            }
        }
    }

    if !report.failed.is_empty() {
        tracing::warn!(
            failed = report.failed.len(),
            "registry overlay finished with failed lookups"
        );
    }
    report
}

/// Overlay against the Consul catalog at `url`.
///
/// An empty `url` disables the overlay and leaves `inventory` untouched.
pub fn overlay_from_url(
    inventory: &mut CanonicalInventory,
    url: &str,
    timeout: Duration,
) -> Result<OverlayReport, RegistryError> {
    if url.trim().is_empty() {
        tracing::debug!("no registry configured; overlay skipped");
        return Ok(OverlayReport::default());
    }
    let catalog = ConsulCatalog::new(url, timeout)?;
    Ok(apply_registry_overlay(inventory, &catalog))
}
