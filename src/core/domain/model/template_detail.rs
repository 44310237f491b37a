//! Structured view of a VM template's configuration.
//!
//! Built by [`crate::normalize::parse_vm_template_detail`] from the raw
//! `/nodes/{node}/qemu/{vmid}/config` mapping.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuTopology {
    pub cores: u32,
    pub sockets: u32,
}

impl CpuTopology {
    pub fn total(&self) -> u32 {
        self.cores.saturating_mul(self.sockets)
    }
}

impl Default for CpuTopology {
    fn default() -> Self {
        Self {
            cores: 0,
            sockets: 1,
        }
    }
}

/// One disk entry (`scsi0`, `virtio1`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskDescriptor {
    pub interface: String,
    /// Storage name, when the value has a `storage:volume` prefix.
    pub storage: Option<String>,
    /// Raw `size=` token value.
    pub size: Option<String>,
    /// Size in GB, when `size` could be parsed.
    pub size_gb: Option<f64>,
    /// The unparsed configuration value.
    pub config: String,
}

/// One network entry (`net0`, `net1`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInterface {
    pub interface: String,
    pub model: Option<String>,
    pub bridge: Option<String>,
    /// All `key=value` tokens of the configuration value.
    pub options: BTreeMap<String, String>,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmTemplateDetail {
    pub vmid: u32,
    pub name: String,
    pub node: String,
    pub description: String,
    pub ostype: String,
    pub cpu: CpuTopology,
    pub memory_mb: u64,
    pub disks: Vec<DiskDescriptor>,
    pub networks: Vec<NetworkInterface>,
    /// Sum of the disk sizes that could be parsed, in GB.
    pub total_disk_gb: f64,
    pub boot_order: Option<String>,
    pub bios: Option<String>,
    pub machine: Option<String>,
    pub qemu_agent: Option<String>,
}
