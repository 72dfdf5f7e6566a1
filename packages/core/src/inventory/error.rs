//! Inventory-specific error types

use thiserror::Error;

/// Errors that can occur while loading the inventory
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to read the inventory file
    #[error("Failed to read inventory file: {0}")]
    ReadFailed(String),

    /// Inventory file did not parse as the expected structure
    #[error("Invalid inventory: {0}")]
    ParseFailed(String),
}
