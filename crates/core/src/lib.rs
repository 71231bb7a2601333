//! `invsync-core`: canonical inventory model and deep merge.
//!
//! This crate is pure: no IO, no process spawning, no HTTP. Everything that loads
//! or fetches inventories lives in `invsync-inventory` and `invsync-infra`.

pub mod error;
pub mod inventory;
pub mod merge;

pub use error::{InventoryError, InventoryResult};
pub use inventory::{CanonicalInventory, GroupEntry, HOSTVARS_KEY, META_KEY, VariableMap};
pub use merge::deep_merge;
