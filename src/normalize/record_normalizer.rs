//! Conversion of raw API records into typed domain records.
//!
//! Every function here is total: a missing or mistyped field takes its
//! zero value instead of failing the record.

use crate::core::domain::model::{
    GuestKind, GuestRecord, GuestStatus, MemberType, NodeRef, PoolMember, PoolRecord, RawRecord,
    StorageBackend, StorageVolume,
};

/// Normalizes one entry of `nodes/{node}/qemu` or `nodes/{node}/lxc`.
///
/// `node_hint` is used when the record does not name its node, which is the
/// case for node-scoped listings.
pub fn normalize_guest(raw: &RawRecord, kind: GuestKind, node_hint: Option<&str>) -> GuestRecord {
    GuestRecord {
        vmid: raw
            .u64_field("vmid")
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(0),
        name: raw.text_field("name").unwrap_or_default(),
        status: raw
            .str_field("status")
            .map(GuestStatus::parse)
            .unwrap_or_default(),
        cpu_fraction: raw.f64_field("cpu").unwrap_or(0.0),
        cpus: raw
            .u64_field("cpus")
            .or_else(|| raw.u64_field("maxcpu"))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        memory_used_bytes: raw.u64_field("mem").unwrap_or(0),
        memory_max_bytes: raw.u64_field("maxmem").unwrap_or(0),
        max_disk_bytes: raw.u64_field("maxdisk").unwrap_or(0),
        uptime_seconds: raw.u64_field("uptime").unwrap_or(0),
        is_template: raw.flag("template"),
        node: raw
            .str_field("node")
            .or(node_hint)
            .unwrap_or_default()
            .to_string(),
        kind,
    }
}

/// Normalizes one entry of `nodes`. Entries without a name yield `None`.
pub fn normalize_node(raw: &RawRecord) -> Option<NodeRef> {
    let name = raw.str_field("node").filter(|name| !name.is_empty())?;
    Some(NodeRef {
        name: name.to_string(),
        status: raw.text_field("status").unwrap_or_default(),
        cpu_fraction: raw.f64_field("cpu").unwrap_or(0.0),
        memory_used_bytes: raw.u64_field("mem").unwrap_or(0),
        memory_max_bytes: raw.u64_field("maxmem").unwrap_or(0),
        uptime_seconds: raw.u64_field("uptime").unwrap_or(0),
    })
}

/// Normalizes the body of `pools/{poolid}`.
///
/// Members keep the order the API lists them in. Members of unknown type are
/// dropped.
pub fn normalize_pool(raw: &RawRecord, pool_id: &str) -> PoolRecord {
    let members = raw
        .field("members")
        .cloned()
        .map(RawRecord::list)
        .unwrap_or_default()
        .iter()
        .filter_map(normalize_pool_member)
        .collect();

    PoolRecord {
        id: raw
            .text_field("poolid")
            .unwrap_or_else(|| pool_id.to_string()),
        comment: raw.text_field("comment").filter(|c| !c.is_empty()),
        members,
    }
}

fn normalize_pool_member(raw: &RawRecord) -> Option<PoolMember> {
    let (member_type, id) = match raw.str_field("type")? {
        "qemu" | "lxc" | "openvz" => (MemberType::Vm, raw.text_field("vmid")?),
        "storage" => (MemberType::Storage, raw.text_field("storage")?),
        _ => return None,
    };
    Some(PoolMember {
        member_type,
        id,
        node: raw.text_field("node"),
    })
}

/// Normalizes one entry of `nodes/{node}/storage` or `storage`.
pub fn normalize_storage_backend(raw: &RawRecord) -> Option<StorageBackend> {
    let name = raw.text_field("storage").filter(|name| !name.is_empty())?;
    Some(StorageBackend {
        name,
        storage_type: raw.text_field("type").unwrap_or_default(),
        content: raw.text_field("content").unwrap_or_default(),
        // Cluster-wide listings omit `active`; treat the storage as usable.
        active: raw.field("active").is_none() || raw.flag("active"),
    })
}

/// Normalizes one entry of `nodes/{node}/storage/{storage}/content`.
pub fn normalize_volume(raw: &RawRecord, storage: &str, node: &str) -> Option<StorageVolume> {
    let volume_id = raw.text_field("volid").filter(|id| !id.is_empty())?;
    Some(StorageVolume {
        volume_id,
        storage_name: storage.to_string(),
        node: node.to_string(),
        size_bytes: raw.u64_field("size").unwrap_or(0),
        format: raw.text_field("format").unwrap_or_default(),
        vmid: raw.u64_field("vmid").and_then(|id| u32::try_from(id).ok()),
        ctime: raw.u64_field("ctime"),
    })
}
