//! Storage backends and the volumes they hold.

use serde::Serialize;

/// Storage types that can hold container templates and backups.
const TEMPLATE_CAPABLE_STORAGE_TYPES: [&str; 5] = ["dir", "nfs", "cifs", "glusterfs", "zfspool"];

/// A storage backend configured on a node (`/nodes/{node}/storage`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageBackend {
    pub name: String,
    /// Backend type, e.g. `dir`, `lvmthin`, `nfs`.
    pub storage_type: String,
    /// Comma-separated content types the storage accepts.
    pub content: String,
    pub active: bool,
}

impl StorageBackend {
    pub fn can_hold_templates(&self) -> bool {
        TEMPLATE_CAPABLE_STORAGE_TYPES.contains(&self.storage_type.as_str())
    }

    pub fn accepts(&self, content_type: &str) -> bool {
        self.content
            .split(',')
            .any(|entry| entry.trim() == content_type)
    }
}

/// A volume found in a storage content listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageVolume {
    /// Volume id in `storage:path` form.
    pub volume_id: String,
    pub storage_name: String,
    pub node: String,
    pub size_bytes: u64,
    pub format: String,
    /// Guest the volume belongs to (backups only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u32>,
    /// Creation time as a Unix timestamp, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<u64>,
}

impl StorageVolume {
    /// File name part of the volume id (`local:vztmpl/debian.tar.zst` → `debian.tar.zst`).
    pub fn file_name(&self) -> &str {
        let path = self
            .volume_id
            .split_once(':')
            .map_or(self.volume_id.as_str(), |(_, path)| path);
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// A container OS template (content type `vztmpl`).
pub type TemplateDescriptor = StorageVolume;
