//! `invsync-diagram`: PlantUML rendering of a canonical inventory.

pub mod annotation;
pub mod error;
pub mod plantuml;
pub mod sanitize;

pub use error::DiagramError;
pub use plantuml::render_plantuml;
pub use sanitize::{sanitize_group_name, sanitize_host_name};
