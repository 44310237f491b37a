//! Display rows derived from domain records.
//!
//! These are presentation projections only; the records they are built from
//! stay the source of truth.

use super::units::{UptimeParts, format_gb, format_mb, format_percent};
use crate::core::domain::model::{
    GuestRecord, NodeRef, PoolMember, StorageBackend, StorageVolume, TemplateDescriptor,
    VmTemplateDetail,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestSummaryRow {
    pub vmid: u32,
    pub name: String,
    pub status: String,
    pub node: String,
    pub cpu: String,
    pub memory: String,
    pub uptime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<&'static str>,
}

impl From<&GuestRecord> for GuestSummaryRow {
    fn from(guest: &GuestRecord) -> Self {
        Self {
            vmid: guest.vmid,
            name: guest.name.clone(),
            status: guest.status.to_string(),
            node: guest.node.clone(),
            cpu: format_percent(guest.cpu_fraction),
            memory: format!(
                "{} / {}",
                format_gb(guest.memory_used_bytes),
                format_gb(guest.memory_max_bytes)
            ),
            uptime: UptimeParts::from_seconds(guest.uptime_seconds).to_string(),
            template: guest.is_template.then_some("yes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmTemplateRow {
    pub vmid: u32,
    pub name: String,
    pub node: String,
    pub disk: String,
    pub memory: String,
    pub cpu: String,
}

impl From<&GuestRecord> for VmTemplateRow {
    fn from(guest: &GuestRecord) -> Self {
        Self {
            vmid: guest.vmid,
            name: guest.name.clone(),
            node: if guest.node.is_empty() {
                "unknown".to_string()
            } else {
                guest.node.clone()
            },
            disk: format_gb(guest.max_disk_bytes),
            memory: format_gb(guest.memory_max_bytes),
            cpu: format!("{} cores", guest.cpus),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerTemplateRow {
    pub template: String,
    pub storage: String,
    pub node: String,
    pub size: String,
    pub volid: String,
}

impl From<&TemplateDescriptor> for ContainerTemplateRow {
    fn from(template: &TemplateDescriptor) -> Self {
        Self {
            template: template.file_name().to_string(),
            storage: template.storage_name.clone(),
            node: template.node.clone(),
            size: format_mb(template.size_bytes),
            volid: template.volume_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupRow {
    pub volid: String,
    pub vmid: String,
    pub storage: String,
    pub node: String,
    pub size: String,
    pub format: String,
}

impl From<&StorageVolume> for BackupRow {
    fn from(volume: &StorageVolume) -> Self {
        Self {
            volid: volume.volume_id.clone(),
            vmid: volume.vmid.map(|id| id.to_string()).unwrap_or_default(),
            storage: volume.storage_name.clone(),
            node: volume.node.clone(),
            size: format_gb(volume.size_bytes),
            format: volume.format.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub node: String,
    pub status: String,
    pub cpu: String,
    pub memory: String,
    pub uptime: String,
}

impl From<&NodeRef> for NodeRow {
    fn from(node: &NodeRef) -> Self {
        Self {
            node: node.name.clone(),
            status: node.status.clone(),
            cpu: format_percent(node.cpu_fraction),
            memory: format!(
                "{} / {}",
                format_gb(node.memory_used_bytes),
                format_gb(node.memory_max_bytes)
            ),
            uptime: UptimeParts::from_seconds(node.uptime_seconds).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRow {
    pub storage: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    pub content: String,
    pub active: bool,
}

impl From<&StorageBackend> for StorageRow {
    fn from(storage: &StorageBackend) -> Self {
        Self {
            storage: storage.name.clone(),
            storage_type: storage.storage_type.clone(),
            content: storage.content.clone(),
            active: storage.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolMemberRow {
    #[serde(rename = "type")]
    pub member_type: String,
    pub id: String,
    pub node: String,
}

impl From<&PoolMember> for PoolMemberRow {
    fn from(member: &PoolMember) -> Self {
        Self {
            member_type: member.member_type.to_string(),
            id: member.id.clone(),
            node: member.node.clone().unwrap_or_default(),
        }
    }
}

/// Single-row summary of a VM template for table output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateInfoRow {
    pub vmid: u32,
    pub name: String,
    pub node: String,
    pub ostype: String,
    pub cpu_cores: u32,
    pub cpu_sockets: u32,
    pub total_cpus: u32,
    pub memory: String,
    pub total_disk: String,
    pub description: String,
}

impl From<&VmTemplateDetail> for TemplateInfoRow {
    fn from(detail: &VmTemplateDetail) -> Self {
        Self {
            vmid: detail.vmid,
            name: detail.name.clone(),
            node: detail.node.clone(),
            ostype: detail.ostype.clone(),
            cpu_cores: detail.cpu.cores,
            cpu_sockets: detail.cpu.sockets,
            total_cpus: detail.cpu.total(),
            memory: format!("{:.2}GB", detail.memory_mb as f64 / 1024.0),
            total_disk: if detail.disks.is_empty() {
                "N/A".to_string()
            } else {
                format!("{:.2}GB", detail.total_disk_gb)
            },
            description: truncate(&detail.description, 50),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::{GuestKind, GuestStatus};

    fn guest() -> GuestRecord {
        GuestRecord {
            vmid: 100,
            name: "web".to_string(),
            status: GuestStatus::Running,
            cpu_fraction: 0.125,
            cpus: 2,
            memory_used_bytes: 1_073_741_824,
            memory_max_bytes: 4_294_967_296,
            max_disk_bytes: 34_359_738_368,
            uptime_seconds: 90_061,
            is_template: false,
            node: "pve1".to_string(),
            kind: GuestKind::Qemu,
        }
    }

    #[test]
    fn test_guest_summary_row() {
        let row = GuestSummaryRow::from(&guest());
        assert_eq!(row.cpu, "12.50%");
        assert_eq!(row.memory, "1.00GB / 4.00GB");
        assert_eq!(row.uptime, "1d 1h");
        assert_eq!(row.template, None);

        let value = serde_json::to_value(&row).unwrap();
        assert!(value.get("template").is_none());
    }

    #[test]
    fn test_template_flag_in_summary() {
        let mut template = guest();
        template.is_template = true;
        assert_eq!(GuestSummaryRow::from(&template).template, Some("yes"));
    }

    #[test]
    fn test_vm_template_row() {
        let mut template = guest();
        template.node.clear();
        let row = VmTemplateRow::from(&template);
        assert_eq!(row.disk, "32.00GB");
        assert_eq!(row.cpu, "2 cores");
        assert_eq!(row.node, "unknown");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        let long = "x".repeat(60);
        let cut = truncate(&long, 50);
        assert_eq!(cut.len(), 50);
        assert!(cut.ends_with("..."));
    }
}
