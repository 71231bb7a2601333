//! `invsync-inventory`: static inventory sources.
//!
//! Loads Ansible INI/YAML inventories (plus `group_vars/` and `host_vars/`),
//! resolves per-host variables, and normalizes the result into the canonical
//! shape from `invsync-core`.

pub mod error;
pub mod ini;
pub mod model;
pub mod normalize;
pub mod pattern;
pub mod resolver;
pub mod source;
pub mod vars_files;
pub mod yaml;

pub use error::{StaticResult, StaticSourceError};
pub use model::{ALL_GROUP, Group, Host, StaticInventory, UNGROUPED_GROUP};
pub use normalize::{normalize, normalize_file};
pub use resolver::{BOOKKEEPING_KEYS, LayeredResolver, VarResolver};
pub use source::SourceFormat;
pub use vars_files::VarsFiles;
