//! QEMU virtual machine operations.

use super::task::{TaskWaiter, task_id};
use crate::{
    core::domain::{
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        value_object::{VolumeSpec, validate_identifier},
    },
    session::{ClusterSession, Resource},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;

/// Parameters of a new VM.
#[derive(Debug, Clone)]
pub struct VmSpec {
    pub name: String,
    pub memory_mb: u32,
    pub cores: u32,
    pub sockets: u32,
    /// Boot disk, attached as `scsi0`.
    pub disk: VolumeSpec,
    /// ISO file name, attached as a CD-ROM on `ide2`.
    pub iso: Option<String>,
    /// Storage holding the ISO; defaults to the disk's storage.
    pub iso_storage: Option<String>,
    pub ostype: String,
    pub network_bridge: String,
    pub network_model: String,
}

impl VmSpec {
    pub fn new(name: impl Into<String>, disk: VolumeSpec) -> Self {
        Self {
            name: name.into(),
            memory_mb: 2048,
            cores: 2,
            sockets: 1,
            disk,
            iso: None,
            iso_storage: None,
            ostype: "l26".to_string(),
            network_bridge: "vmbr0".to_string(),
            network_model: "virtio".to_string(),
        }
    }

    fn to_params(&self, vmid: u32) -> ProxmoxResult<Value> {
        validate_identifier("network_bridge", &self.network_bridge)?;
        validate_identifier("network_model", &self.network_model)?;

        let mut params = Map::new();
        params.insert("vmid".into(), json!(vmid));
        params.insert("name".into(), json!(self.name));
        params.insert("memory".into(), json!(self.memory_mb));
        params.insert("cores".into(), json!(self.cores));
        params.insert("sockets".into(), json!(self.sockets));
        params.insert("ostype".into(), json!(self.ostype));
        params.insert(
            "net0".into(),
            json!(format!("{},bridge={}", self.network_model, self.network_bridge)),
        );
        params.insert("scsi0".into(), json!(self.disk.to_string()));
        params.insert("scsihw".into(), json!("virtio-scsi-pci"));

        if let Some(iso) = self.iso.as_deref().filter(|iso| !iso.is_empty()) {
            let storage = self.iso_storage.as_deref().unwrap_or(self.disk.storage());
            validate_identifier("iso_storage", storage)?;
            validate_identifier("iso", iso)?;
            params.insert(
                "ide2".into(),
                json!(format!("{storage}:iso/{iso},media=cdrom")),
            );
        }
        Ok(Value::Object(params))
    }
}

/// Options for [`VmOperations::clone_vm`].
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Node the clone is placed on; defaults to the source node.
    pub target_node: Option<String>,
    pub storage: Option<String>,
    /// Full copy instead of a linked clone.
    pub full: bool,
    pub description: Option<String>,
    pub pool: Option<String>,
    /// Start the clone once the clone task has finished.
    pub start_after_clone: bool,
}

impl CloneOptions {
    fn to_params(&self, new_vmid: u32, name: &str) -> ProxmoxResult<Value> {
        let mut params = Map::new();
        params.insert("newid".into(), json!(new_vmid));
        params.insert("name".into(), json!(name));
        if let Some(target) = &self.target_node {
            validate_identifier("target_node", target)?;
            params.insert("target".into(), json!(target));
        }
        if let Some(storage) = &self.storage {
            validate_identifier("storage", storage)?;
            params.insert("storage".into(), json!(storage));
        }
        if self.full {
            params.insert("full".into(), json!(1));
        }
        if let Some(description) = &self.description {
            params.insert("description".into(), json!(description));
        }
        if let Some(pool) = &self.pool {
            validate_identifier("pool", pool)?;
            params.insert("pool".into(), json!(pool));
        }
        Ok(Value::Object(params))
    }
}

/// Outcome of a create or clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub vmid: u32,
    pub node: String,
    pub task: String,
    /// Task id of the start call, when one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_task: Option<String>,
}

/// VM lifecycle operations on one session.
#[derive(Debug, Clone, Copy)]
pub struct VmOperations<'a> {
    session: &'a ClusterSession,
    waiter: TaskWaiter,
}

impl<'a> VmOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self::with_waiter(session, TaskWaiter::default())
    }

    pub fn with_waiter(session: &'a ClusterSession, waiter: TaskWaiter) -> Self {
        Self { session, waiter }
    }

    /// Creates a VM; with `start`, waits for the create task and boots it.
    pub async fn create(
        &self,
        node: &str,
        vmid: u32,
        spec: &VmSpec,
        start: bool,
    ) -> ProxmoxResult<ProvisionOutcome> {
        validate_identifier("node", node)?;
        let response = self
            .session
            .node(node)
            .child("qemu")
            .post(spec.to_params(vmid)?)
            .await?;
        let task = task_id(&response);
        info!(%node, vmid, %task, "VM creation started");

        let start_task = if start {
            Some(self.start_when_done(node, &task, vmid).await?)
        } else {
            None
        };
        Ok(ProvisionOutcome {
            vmid,
            node: node.to_string(),
            task,
            start_task,
        })
    }

    /// Clones `source_vmid` to `new_vmid`.
    ///
    /// With `start_after_clone`, the clone task is polled until it finishes
    /// and the new VM is started on the target node. A failed or timed-out
    /// clone task is returned as an error and no start is issued.
    pub async fn clone_vm(
        &self,
        node: &str,
        source_vmid: u32,
        new_vmid: u32,
        name: &str,
        options: &CloneOptions,
    ) -> ProxmoxResult<ProvisionOutcome> {
        validate_identifier("node", node)?;
        if source_vmid == new_vmid {
            return Err(ValidationError::field(
                "new_vmid",
                "Clone target must differ from the source VM",
            )
            .into());
        }

        let response = self
            .session
            .node(node)
            .child("qemu")
            .child(source_vmid)
            .child("clone")
            .post(options.to_params(new_vmid, name)?)
            .await?;
        let task = task_id(&response);
        info!(%node, source_vmid, new_vmid, %task, "clone started");

        let target = options.target_node.as_deref().unwrap_or(node);
        let start_task = if options.start_after_clone {
            if task.is_empty() {
                return Err(ProxmoxError::RemoteApi {
                    status_code: 0,
                    message: format!("Clone of VM {source_vmid} returned no task id"),
                });
            }
            // The clone task runs on the source node.
            self.waiter.wait(self.session, node, &task).await?;
            Some(self.start(target, new_vmid).await?)
        } else {
            None
        };

        Ok(ProvisionOutcome {
            vmid: new_vmid,
            node: target.to_string(),
            task,
            start_task,
        })
    }

    pub async fn start(&self, node: &str, vmid: u32) -> ProxmoxResult<String> {
        let response = self.status(node, vmid).child("start").post(json!({})).await?;
        Ok(task_id(&response))
    }

    pub async fn stop(&self, node: &str, vmid: u32) -> ProxmoxResult<String> {
        let response = self.status(node, vmid).child("stop").post(json!({})).await?;
        Ok(task_id(&response))
    }

    pub async fn current_status(&self, node: &str, vmid: u32) -> ProxmoxResult<Value> {
        self.status(node, vmid).child("current").get().await
    }

    /// Raw configuration mapping (`qemu/{vmid}/config`).
    pub async fn config(&self, node: &str, vmid: u32) -> ProxmoxResult<Value> {
        self.session
            .node(node)
            .child("qemu")
            .child(vmid)
            .child("config")
            .get()
            .await
    }

    async fn start_when_done(&self, node: &str, task: &str, vmid: u32) -> ProxmoxResult<String> {
        self.waiter.wait(self.session, node, task).await?;
        self.start(node, vmid).await
    }

    fn status(&self, node: &str, vmid: u32) -> Resource<'a> {
        self.session
            .node(node)
            .child("qemu")
            .child(vmid)
            .child("status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_params() {
        let mut spec = VmSpec::new("web", VolumeSpec::new("local-lvm", 32).unwrap());
        spec.iso = Some("debian-12.iso".to_string());
        spec.iso_storage = Some("local".to_string());

        let params = spec.to_params(100).unwrap();
        assert_eq!(params["scsi0"], "local-lvm:32");
        assert_eq!(params["net0"], "virtio,bridge=vmbr0");
        assert_eq!(params["ide2"], "local:iso/debian-12.iso,media=cdrom");
        assert_eq!(params["memory"], 2048);
    }

    #[test]
    fn test_iso_name_cannot_inject_drive_options() {
        let mut spec = VmSpec::new("web", VolumeSpec::new("local-lvm", 32).unwrap());
        spec.iso = Some("debian-12.iso,cache=unsafe".to_string());
        assert!(matches!(
            spec.to_params(100),
            Err(ProxmoxError::Validation(ValidationError::Field { .. }))
        ));
    }

    #[test]
    fn test_clone_params() {
        let options = CloneOptions {
            target_node: Some("pve2".to_string()),
            full: true,
            pool: Some("prod".to_string()),
            ..Default::default()
        };
        let params = options.to_params(101, "web-clone").unwrap();
        assert_eq!(
            params,
            json!({
                "newid": 101,
                "name": "web-clone",
                "target": "pve2",
                "full": 1,
                "pool": "prod"
            })
        );
    }

    #[test]
    fn test_clone_params_reject_bad_identifiers() {
        let options = CloneOptions {
            storage: Some("local,lvm".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            options.to_params(101, "x"),
            Err(ProxmoxError::Validation(_))
        ));
    }
}
