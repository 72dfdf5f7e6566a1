//! Cluster inventory
//!
//! Loads the hosts.yaml inventory file: a `machine` key holding the list of
//! cluster machines with their SSH credentials.

pub mod error;
pub mod schema;

use std::fs;
use std::path::Path;

pub use error::InventoryError;
pub use schema::{HostEntry, Inventory};

/// Load the inventory from a YAML file
///
/// Fatal on any failure: a run must never proceed on a partial or defaulted
/// inventory. Callers decide how to surface the error; nothing is retried.
pub fn load_inventory(path: &Path) -> Result<Inventory, InventoryError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        InventoryError::ReadFailed(format!("{}: {}", path.display(), e))
    })?;

    let inventory: Inventory = serde_yaml::from_str(&contents).map_err(|e| {
        InventoryError::ParseFailed(format!("{}: {}", path.display(), e))
    })?;

    tracing::debug!(
        "Loaded {} machines from {}",
        inventory.len(),
        path.display()
    );
    Ok(inventory)
}
