//! Parsing of VM configuration mappings into [`VmTemplateDetail`].

use super::units::parse_size_gb;
use crate::core::domain::model::{
    CpuTopology, DiskDescriptor, NetworkInterface, RawRecord, VmTemplateDetail,
};
use std::collections::BTreeMap;

const DISK_BUSES: [&str; 4] = ["scsi", "sata", "ide", "virtio"];

/// Builds the structured view of a VM configuration
/// (`nodes/{node}/qemu/{vmid}/config`).
///
/// Disks and network interfaces are listed by bus and index
/// (`scsi0`, `scsi1`, ..., `virtio0`). Disk sizes that cannot be parsed are
/// left out of `total_disk_gb`, the disk itself is still listed.
pub fn parse_vm_template_detail(config: &RawRecord, vmid: u32, node: &str) -> VmTemplateDetail {
    let mut disks = Vec::new();
    let mut networks = Vec::new();

    for (key, value) in config.text_entries() {
        if let Some(index) = indexed_key(key, "net") {
            networks.push((index, parse_network(key, &value)));
        } else if let Some(order) = disk_order(key) {
            disks.push((order, parse_disk(key, &value)));
        }
    }

    disks.sort_by(|(a, _), (b, _)| a.cmp(b));
    networks.sort_by_key(|(index, _)| *index);
    let disks: Vec<DiskDescriptor> = disks.into_iter().map(|(_, disk)| disk).collect();
    let networks: Vec<NetworkInterface> = networks.into_iter().map(|(_, net)| net).collect();

    let total_disk_gb: f64 = disks.iter().filter_map(|disk| disk.size_gb).sum();

    VmTemplateDetail {
        vmid,
        name: config.text_field("name").unwrap_or_default(),
        node: node.to_string(),
        description: config.text_field("description").unwrap_or_default(),
        ostype: config
            .text_field("ostype")
            .unwrap_or_else(|| "other".to_string()),
        cpu: CpuTopology {
            cores: config
                .u64_field("cores")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            sockets: config
                .u64_field("sockets")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(1),
        },
        memory_mb: config.u64_field("memory").unwrap_or(0),
        disks,
        networks,
        total_disk_gb,
        boot_order: config.text_field("boot"),
        bios: config.text_field("bios"),
        machine: config.text_field("machine"),
        qemu_agent: config.text_field("agent"),
    }
}

/// Returns `n` for keys of the form `{prefix}{n}`.
fn indexed_key(key: &str, prefix: &str) -> Option<u32> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn disk_order(key: &str) -> Option<(usize, u32)> {
    DISK_BUSES
        .iter()
        .enumerate()
        .find_map(|(bus, prefix)| indexed_key(key, prefix).map(|index| (bus, index)))
}

/// Splits `a=1,b=2,flag` into its `key=value` pairs. Tokens without `=` are
/// ignored.
fn key_values(value: &str) -> impl Iterator<Item = (&str, &str)> {
    value
        .split(',')
        .filter_map(|token| token.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
}

fn parse_disk(key: &str, value: &str) -> DiskDescriptor {
    let storage = value
        .split(',')
        .next()
        .and_then(|volume| volume.split_once(':'))
        .map(|(storage, _)| storage.trim().to_string())
        .filter(|storage| !storage.is_empty());
    let size = key_values(value)
        .find(|(k, _)| *k == "size")
        .map(|(_, v)| v.to_string());
    let size_gb = size.as_deref().and_then(parse_size_gb);

    DiskDescriptor {
        interface: key.to_string(),
        storage,
        size,
        size_gb,
        config: value.to_string(),
    }
}

fn parse_network(key: &str, value: &str) -> NetworkInterface {
    let options: BTreeMap<String, String> = key_values(value)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // `virtio=AA:BB:..,bridge=vmbr0` names the model by its first key, while
    // `virtio,bridge=vmbr0` names it by a bare token.
    let model = options.get("model").cloned().or_else(|| {
        value
            .split(',')
            .next()
            .map(|first| first.split_once('=').map_or(first, |(k, _)| k).trim())
            .filter(|model| !model.is_empty() && *model != "bridge")
            .map(str::to_string)
    });

    NetworkInterface {
        interface: key.to_string(),
        model,
        bridge: options.get("bridge").cloned(),
        options,
        config: value.to_string(),
    }
}
