//! LXC container operations.

use super::task::task_id;
use crate::{
    core::domain::{
        error::ProxmoxResult,
        value_object::{Secret, VolumeSpec, validate_identifier},
    },
    session::{ClusterSession, Resource},
};
use serde_json::{Map, Value, json};
use tracing::info;

/// Parameters of a new container. The root filesystem is allocated as
/// `{rootfs.storage}:{rootfs.size_gb}`.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub rootfs: VolumeSpec,
    pub hostname: Option<String>,
    pub password: Option<Secret>,
    pub memory_mb: u32,
    pub cores: u32,
    pub nameserver: Option<String>,
    pub searchdomain: Option<String>,
    /// Raw `net0` value, e.g. `name=eth0,bridge=vmbr0,ip=dhcp`.
    pub net0: Option<String>,
}

impl ContainerSpec {
    pub fn new(rootfs: VolumeSpec) -> Self {
        Self {
            rootfs,
            hostname: None,
            password: None,
            memory_mb: 512,
            cores: 1,
            nameserver: None,
            searchdomain: None,
            net0: None,
        }
    }

    fn to_params(&self, vmid: u32, ostemplate: &str) -> Value {
        let mut params = Map::new();
        params.insert("vmid".into(), json!(vmid));
        params.insert("ostemplate".into(), json!(ostemplate));
        params.insert("rootfs".into(), json!(self.rootfs.to_string()));
        params.insert("memory".into(), json!(self.memory_mb));
        params.insert("cores".into(), json!(self.cores));

        let optional = [
            ("hostname", self.hostname.as_deref()),
            ("password", self.password.as_ref().map(Secret::expose)),
            ("nameserver", self.nameserver.as_deref()),
            ("searchdomain", self.searchdomain.as_deref()),
            ("net0", self.net0.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                params.insert(key.into(), json!(value));
            }
        }
        Value::Object(params)
    }
}

/// Container lifecycle and template management on one session.
#[derive(Debug, Clone, Copy)]
pub struct ContainerOperations<'a> {
    session: &'a ClusterSession,
}

impl<'a> ContainerOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    /// Creates a container from an OS template and returns the task id.
    ///
    /// `vmid` uniqueness is left to the server.
    pub async fn create(
        &self,
        node: &str,
        vmid: u32,
        ostemplate: &str,
        spec: &ContainerSpec,
    ) -> ProxmoxResult<String> {
        validate_identifier("node", node)?;
        let response = self
            .session
            .node(node)
            .child("lxc")
            .post(spec.to_params(vmid, ostemplate))
            .await?;
        info!(%node, vmid, "container creation started");
        Ok(task_id(&response))
    }

    pub async fn start(&self, node: &str, vmid: u32) -> ProxmoxResult<String> {
        let response = self.status(node, vmid).child("start").post(json!({})).await?;
        Ok(task_id(&response))
    }

    pub async fn stop(&self, node: &str, vmid: u32) -> ProxmoxResult<String> {
        let response = self.status(node, vmid).child("stop").post(json!({})).await?;
        Ok(task_id(&response))
    }

    /// Current runtime status (`status/current`).
    pub async fn current_status(&self, node: &str, vmid: u32) -> ProxmoxResult<Value> {
        self.status(node, vmid).child("current").get().await
    }

    /// Templates offered by the configured appliance repositories.
    pub async fn available_templates(&self, node: &str) -> ProxmoxResult<Value> {
        self.session.node(node).child("aplinfo").get().await
    }

    /// Starts downloading `template` from the appliance repository into
    /// `storage`.
    pub async fn download_template(
        &self,
        node: &str,
        storage: &str,
        template: &str,
    ) -> ProxmoxResult<String> {
        validate_identifier("storage", storage)?;
        let response = self
            .session
            .node(node)
            .child("aplinfo")
            .post(json!({ "storage": storage, "template": template }))
            .await?;
        Ok(task_id(&response))
    }

    fn status(&self, node: &str, vmid: u32) -> Resource<'a> {
        self.session
            .node(node)
            .child("lxc")
            .child(vmid)
            .child("status")
    }
}
