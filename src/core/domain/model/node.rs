//! Cluster topology as seen by a single aggregation.

use serde::Serialize;

/// A node in the cluster, taken from `/nodes`.
///
/// Only the name is needed to address node-scoped endpoints. The remaining
/// fields are informational and default to zero or empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRef {
    /// The node name (e.g., "pve1").
    pub name: String,
    /// Reported status (e.g., "online", "offline").
    pub status: String,
    /// CPU usage as a fraction in `[0, 1]`.
    pub cpu_fraction: f64,
    pub memory_used_bytes: u64,
    pub memory_max_bytes: u64,
    pub uptime_seconds: u64,
}

impl NodeRef {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}
