//! Normalized records for the two workload types a node hosts.
//!
//! A [`GuestRecord`] is the typed view of an entry returned by
//! `/nodes/{node}/qemu` or `/nodes/{node}/lxc`. Derived presentation fields
//! (GB strings, percentages) are computed from it on demand, see
//! [`crate::normalize`].

use serde::Serialize;
use std::fmt;

/// Workload type of a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestKind {
    /// Full virtual machine (`qemu` endpoints).
    Qemu,
    /// OS-level container (`lxc` endpoints).
    Lxc,
}

impl GuestKind {
    /// Path segment used under `nodes/{node}/`.
    pub fn segment(self) -> &'static str {
        match self {
            GuestKind::Qemu => "qemu",
            GuestKind::Lxc => "lxc",
        }
    }
}

impl fmt::Display for GuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Power state of a guest. Unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GuestStatus {
    Running,
    Stopped,
    Paused,
    Suspended,
    Other(String),
}

impl GuestStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "running" => GuestStatus::Running,
            "stopped" => GuestStatus::Stopped,
            "paused" => GuestStatus::Paused,
            "suspended" => GuestStatus::Suspended,
            other => GuestStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GuestStatus::Running => "running",
            GuestStatus::Stopped => "stopped",
            GuestStatus::Paused => "paused",
            GuestStatus::Suspended => "suspended",
            GuestStatus::Other(other) => other,
        }
    }
}

impl Default for GuestStatus {
    fn default() -> Self {
        GuestStatus::Other("unknown".to_string())
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GuestStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A virtual machine or container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestRecord {
    /// Cluster-unique guest identifier.
    pub vmid: u32,
    pub name: String,
    pub status: GuestStatus,
    /// CPU usage as a fraction in `[0, 1]`.
    pub cpu_fraction: f64,
    /// Number of virtual CPUs.
    pub cpus: u32,
    pub memory_used_bytes: u64,
    pub memory_max_bytes: u64,
    pub max_disk_bytes: u64,
    pub uptime_seconds: u64,
    pub is_template: bool,
    /// Node currently hosting the guest.
    pub node: String,
    pub kind: GuestKind,
}

/// Alias used where only virtual machines are expected.
pub type VmRecord = GuestRecord;
/// Alias used where only containers are expected.
pub type ContainerRecord = GuestRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrips_known_and_unknown_values() {
        assert_eq!(GuestStatus::parse("running"), GuestStatus::Running);
        assert_eq!(GuestStatus::parse("paused").as_str(), "paused");

        let odd = GuestStatus::parse("prelaunch");
        assert_eq!(odd, GuestStatus::Other("prelaunch".to_string()));
        assert_eq!(odd.to_string(), "prelaunch");
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let value = serde_json::to_value(GuestStatus::Stopped).unwrap();
        assert_eq!(value, serde_json::json!("stopped"));
    }

    #[test]
    fn test_kind_segment() {
        assert_eq!(GuestKind::Qemu.segment(), "qemu");
        assert_eq!(GuestKind::Lxc.to_string(), "lxc");
    }
}
