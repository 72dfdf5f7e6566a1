//! Inventory schema
//!
//! Data structures for the hosts.yaml inventory file.

use serde::{Deserialize, Serialize};

/// One machine in the cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HostEntry {
    /// Hostname or IP address
    pub host: String,

    /// SSH username
    pub user: String,

    /// SSH password, used by sshpass during key distribution
    pub pass: String,
}

impl HostEntry {
    /// The `user@host` login target for this entry
    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Root structure of hosts.yaml
///
/// A missing or empty `machine` key is a valid inventory describing zero
/// machines; a run over it is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    /// Machines in file order
    #[serde(default)]
    pub machine: Vec<HostEntry>,
}

impl Inventory {
    /// Number of machines in the inventory
    pub fn len(&self) -> usize {
        self.machine.len()
    }

    /// Whether the inventory describes zero machines
    pub fn is_empty(&self) -> bool {
        self.machine.is_empty()
    }
}
