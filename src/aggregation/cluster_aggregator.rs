//! Cross-node reads with per-node fault isolation.

use super::policy::{Aggregated, AggregationPolicy, Source};
use crate::{
    core::domain::{
        error::ProxmoxResult,
        model::{GuestKind, GuestRecord, NodeRef, RawRecord, StorageBackend, StorageVolume},
    },
    normalize::{normalize_guest, normalize_node, normalize_storage_backend, normalize_volume},
    session::ClusterSession,
};
use futures::future::join_all;
use serde_json::json;
use tracing::debug;

/// Fans reads out over the cluster's nodes.
///
/// Node enumeration is a single call whose failure is fatal. Everything
/// after it is queried concurrently, and failures are handled by the
/// [`AggregationPolicy`]. Results keep node enumeration order.
#[derive(Debug, Clone, Copy)]
pub struct ClusterAggregator<'a> {
    session: &'a ClusterSession,
    policy: AggregationPolicy,
}

impl<'a> ClusterAggregator<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self::with_policy(session, AggregationPolicy::default())
    }

    pub fn with_policy(session: &'a ClusterSession, policy: AggregationPolicy) -> Self {
        Self { session, policy }
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Lists the cluster's nodes. Errors propagate.
    pub async fn list_nodes(&self) -> ProxmoxResult<Vec<NodeRef>> {
        let nodes = self.session.nodes().get().await?;
        Ok(RawRecord::list(nodes)
            .iter()
            .filter_map(normalize_node)
            .collect())
    }

    /// VMs of one node (errors propagate) or of the whole cluster.
    pub async fn list_vms(&self, node: Option<&str>) -> ProxmoxResult<Aggregated<GuestRecord>> {
        self.list_guests(GuestKind::Qemu, node).await
    }

    /// Containers of one node (errors propagate) or of the whole cluster.
    pub async fn list_containers(
        &self,
        node: Option<&str>,
    ) -> ProxmoxResult<Aggregated<GuestRecord>> {
        self.list_guests(GuestKind::Lxc, node).await
    }

    pub async fn list_vms_cluster_wide(&self) -> ProxmoxResult<Aggregated<GuestRecord>> {
        self.guests_cluster_wide(GuestKind::Qemu).await
    }

    pub async fn list_containers_cluster_wide(&self) -> ProxmoxResult<Aggregated<GuestRecord>> {
        self.guests_cluster_wide(GuestKind::Lxc).await
    }

    /// VMs flagged as templates.
    pub async fn list_vm_templates(
        &self,
        node: Option<&str>,
    ) -> ProxmoxResult<Aggregated<GuestRecord>> {
        Ok(self
            .list_vms(node)
            .await?
            .filter(|guest| guest.is_template))
    }

    /// Finds the node hosting VM template `vmid`, scanning nodes in order.
    pub async fn locate_template(&self, vmid: u32) -> ProxmoxResult<Option<String>> {
        let templates = self.list_vm_templates(None).await?;
        Ok(templates
            .into_items()
            .into_iter()
            .find(|guest| guest.vmid == vmid)
            .map(|guest| guest.node))
    }

    /// Container OS templates (`vztmpl`) on template-capable storages.
    ///
    /// Both the node and the storage filter are optional. Failures on a node
    /// or on a single storage are handled by the policy.
    pub async fn list_container_templates(
        &self,
        node: Option<&str>,
        storage: Option<&str>,
    ) -> ProxmoxResult<Aggregated<StorageVolume>> {
        self.storage_content(node, storage, "vztmpl", StorageBackend::can_hold_templates)
            .await
    }

    /// Backup archives on storages that accept `backup` content.
    pub async fn list_backups(
        &self,
        node: Option<&str>,
        storage: Option<&str>,
    ) -> ProxmoxResult<Aggregated<StorageVolume>> {
        self.storage_content(node, storage, "backup", |backend| {
            backend.accepts("backup")
        })
        .await
    }

    async fn list_guests(
        &self,
        kind: GuestKind,
        node: Option<&str>,
    ) -> ProxmoxResult<Aggregated<GuestRecord>> {
        match node {
            Some(node) => Ok(Aggregated::complete(self.node_guests(kind, node).await?)),
            None => self.guests_cluster_wide(kind).await,
        }
    }

    async fn guests_cluster_wide(&self, kind: GuestKind) -> ProxmoxResult<Aggregated<GuestRecord>> {
        let nodes = self.list_nodes().await?;
        debug!(%kind, nodes = nodes.len(), "listing guests cluster-wide");

        let results = join_all(nodes.iter().map(|node| async move {
            let result = self
                .node_guests(kind, &node.name)
                .await
                .map(Aggregated::complete);
            (Source::node(&node.name), result)
        }))
        .await;

        self.policy.settle(results)
    }

    async fn node_guests(&self, kind: GuestKind, node: &str) -> ProxmoxResult<Vec<GuestRecord>> {
        let raw = self.session.node(node).child(kind.segment()).get().await?;
        Ok(RawRecord::list(raw)
            .iter()
            .map(|record| normalize_guest(record, kind, Some(node)))
            .collect())
    }

    async fn candidate_nodes(&self, node: Option<&str>) -> ProxmoxResult<Vec<String>> {
        match node {
            Some(node) => Ok(vec![node.to_string()]),
            None => Ok(self
                .list_nodes()
                .await?
                .into_iter()
                .map(|node| node.name)
                .collect()),
        }
    }

    async fn storage_content(
        &self,
        node: Option<&str>,
        storage: Option<&str>,
        content: &str,
        eligible: impl Fn(&StorageBackend) -> bool + Copy,
    ) -> ProxmoxResult<Aggregated<StorageVolume>> {
        let nodes = self.candidate_nodes(node).await?;

        let results = join_all(nodes.iter().map(|node| async move {
            let result = self
                .node_storage_content(node, storage, content, eligible)
                .await;
            (Source::node(node), result)
        }))
        .await;

        self.policy.settle(results)
    }

    async fn node_storage_content(
        &self,
        node: &str,
        storage_filter: Option<&str>,
        content: &str,
        eligible: impl Fn(&StorageBackend) -> bool,
    ) -> ProxmoxResult<Aggregated<StorageVolume>> {
        let raw = self.session.node(node).child("storage").get().await?;
        let backends: Vec<StorageBackend> = RawRecord::list(raw)
            .iter()
            .filter_map(normalize_storage_backend)
            .filter(|backend| eligible(backend))
            .filter(|backend| storage_filter.is_none_or(|wanted| backend.name == wanted))
            .collect();

        let results = join_all(backends.iter().map(|backend| async move {
            let result = self
                .volumes(node, &backend.name, content)
                .await
                .map(Aggregated::complete);
            (Source::storage(node, &backend.name), result)
        }))
        .await;

        self.policy.settle(results)
    }

    async fn volumes(
        &self,
        node: &str,
        storage: &str,
        content: &str,
    ) -> ProxmoxResult<Vec<StorageVolume>> {
        let raw = self
            .session
            .node(node)
            .child("storage")
            .child(storage)
            .child("content")
            .get_with(json!({ "content": content }))
            .await?;
        Ok(RawRecord::list(raw)
            .iter()
            .filter_map(|record| normalize_volume(record, storage, node))
            .collect())
    }
}
