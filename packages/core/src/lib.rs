//! keyseed-core - Core library for keyseed
//!
//! Inventory loading, local identity resolution, key distribution planning,
//! and plan execution. The CLI crate is a thin front-end over this library.

pub mod exec;
pub mod inventory;
pub mod net;
pub mod plan;

pub use exec::{ExecError, run_plan};
pub use inventory::{HostEntry, Inventory, InventoryError, load_inventory};
pub use net::{first_non_loopback_ipv4, local_ipv4};
pub use plan::{CommandPair, Invocation, build_plan, build_plan_with, reorder_keygen_first};
