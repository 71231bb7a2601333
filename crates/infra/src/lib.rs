//! Infrastructure layer: config, dynamic inventory scripts, service registry,
//! and the pipeline that ties them to the static inventory.

pub mod config;
pub mod dynamic;
pub mod overlay;
pub mod pipeline;
pub mod registry;

pub use config::{Config, ConfigError, ConfigLocator};
pub use dynamic::{DynamicInventoryScript, FetchError, fetch_dynamic_inventory};
pub use overlay::{OverlayReport, apply_registry_overlay, overlay_from_url};
pub use pipeline::{InventoryPipeline, PipelineError};
pub use registry::{ConsulCatalog, RegistryError, ServiceRegistry};
