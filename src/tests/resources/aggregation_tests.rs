use crate::{
    AggregationPolicy, ClusterAggregator, ClusterSession, NodeFailure, ProxmoxError,
    ProxmoxResult, core::infrastructure::api_client::MockApiTransport,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn offline() -> ProxmoxError {
    ProxmoxError::RemoteApi {
        status_code: 595,
        message: "no route to host".to_string(),
    }
}

/// Three nodes; `b` cannot be reached for guest listings.
fn cluster(path: &str) -> ProxmoxResult<Value> {
    match path {
        "nodes" => Ok(json!([
            {"node": "a", "status": "online"},
            {"node": "b", "status": "online"},
            {"node": "c", "status": "online"}
        ])),
        "nodes/a/qemu" => Ok(json!([
            {"vmid": 100, "name": "web", "status": "running"},
            {"vmid": 9000, "name": "debian-tpl", "status": "stopped", "template": 1}
        ])),
        "nodes/b/qemu" => Err(offline()),
        "nodes/c/qemu" => Ok(json!([{"vmid": 200, "name": "db", "status": "stopped"}])),
        "nodes/a/lxc" | "nodes/c/lxc" => Ok(json!([])),
        "nodes/b/lxc" => Ok(json!([{"vmid": 300, "name": "proxy", "status": "running"}])),
        other => panic!("unexpected request to {other}"),
    }
}

fn session_for(responder: fn(&str) -> ProxmoxResult<Value>) -> ClusterSession {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .returning(move |_, path, _| responder(&path.to_string()));
    ClusterSession::with_transport(Arc::new(transport))
}

fn aggregator(session: &ClusterSession, failure: NodeFailure) -> ClusterAggregator<'_> {
    ClusterAggregator::with_policy(session, AggregationPolicy::new(failure))
}

#[tokio::test]
async fn test_unreachable_node_is_skipped() {
    let session = session_for(cluster);
    let vms = aggregator(&session, NodeFailure::Skip)
        .list_vms(None)
        .await
        .unwrap();

    let ids: Vec<u32> = vms.items.iter().map(|vm| vm.vmid).collect();
    assert_eq!(ids, vec![100, 9000, 200]);
    assert_eq!(vms.items[0].node, "a");
    assert_eq!(vms.items[2].node, "c");
    assert!(vms.is_complete());
}

#[tokio::test]
async fn test_unreachable_node_is_reported_when_collecting() {
    let session = session_for(cluster);
    let vms = aggregator(&session, NodeFailure::Collect)
        .list_vms(None)
        .await
        .unwrap();

    assert_eq!(vms.items.len(), 3);
    assert_eq!(vms.skipped.len(), 1);
    assert_eq!(vms.skipped[0].node, "b");
    assert_eq!(vms.skipped[0].storage, None);
    assert!(vms.skipped[0].reason.contains("no route to host"));
}

#[tokio::test]
async fn test_unreachable_node_aborts_when_strict() {
    let session = session_for(cluster);
    let result = aggregator(&session, NodeFailure::Abort).list_vms(None).await;
    assert!(matches!(
        result,
        Err(ProxmoxError::RemoteApi {
            status_code: 595,
            ..
        })
    ));
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let session = session_for(cluster);
    let aggregator = ClusterAggregator::new(&session);

    let first = aggregator.list_containers(None).await.unwrap();
    let second = aggregator.list_containers(None).await.unwrap();
    assert_eq!(first.items, second.items);
    assert_eq!(first.items[0].name, "proxy");
    assert_eq!(first.items[0].node, "b");
}

#[tokio::test]
async fn test_node_listing_is_idempotent() {
    let session = session_for(cluster);
    let aggregator = ClusterAggregator::new(&session);

    let first = aggregator.list_nodes().await.unwrap();
    let second = aggregator.list_nodes().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn test_node_scoped_listing_propagates_errors() {
    let session = session_for(cluster);
    let result = aggregator(&session, NodeFailure::Skip)
        .list_vms(Some("b"))
        .await;
    assert!(matches!(result, Err(ProxmoxError::RemoteApi { .. })));
}

#[tokio::test]
async fn test_node_enumeration_failure_is_fatal() {
    let session = session_for(|path| match path {
        "nodes" => Err(ProxmoxError::Authentication("ticket expired".to_string())),
        other => panic!("unexpected request to {other}"),
    });
    let result = aggregator(&session, NodeFailure::Skip).list_vms(None).await;
    assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
}

#[tokio::test]
async fn test_templates_and_locate() {
    let session = session_for(cluster);
    let aggregator = ClusterAggregator::new(&session);

    let templates = aggregator.list_vm_templates(None).await.unwrap();
    assert_eq!(templates.items.len(), 1);
    assert_eq!(templates.items[0].vmid, 9000);

    assert_eq!(aggregator.locate_template(9000).await.unwrap().as_deref(), Some("a"));
    assert_eq!(aggregator.locate_template(100).await.unwrap(), None);
}

fn storage_cluster(path: &str) -> ProxmoxResult<Value> {
    match path {
        "nodes" => Ok(json!([{"node": "a"}, {"node": "b"}])),
        "nodes/a/storage" => Ok(json!([
            {"storage": "local", "type": "dir", "content": "iso,vztmpl,backup"},
            {"storage": "local-lvm", "type": "lvmthin", "content": "images,rootdir"},
            {"storage": "nas", "type": "nfs", "content": "vztmpl,backup"}
        ])),
        "nodes/b/storage" => Ok(json!([
            {"storage": "local", "type": "dir", "content": "vztmpl"}
        ])),
        "nodes/a/storage/local/content" => Ok(json!([
            {"volid": "local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst", "size": 126_000_000, "format": "tzst"}
        ])),
        "nodes/a/storage/nas/content" => Err(offline()),
        "nodes/b/storage/local/content" => Ok(json!([
            {"volid": "local:vztmpl/alpine-3.19-default_20240207_amd64.tar.xz", "size": 3_000_000, "format": "txz"}
        ])),
        other => panic!("unexpected request to {other}"),
    }
}

#[tokio::test]
async fn test_container_templates_skip_failed_storage() {
    let session = session_for(storage_cluster);
    let templates = aggregator(&session, NodeFailure::Collect)
        .list_container_templates(None, None)
        .await
        .unwrap();

    let volumes: Vec<(&str, &str)> = templates
        .items
        .iter()
        .map(|v| (v.node.as_str(), v.volume_id.as_str()))
        .collect();
    assert_eq!(
        volumes,
        vec![
            ("a", "local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst"),
            ("b", "local:vztmpl/alpine-3.19-default_20240207_amd64.tar.xz"),
        ]
    );
    assert_eq!(templates.skipped.len(), 1);
    assert_eq!(templates.skipped[0].node, "a");
    assert_eq!(templates.skipped[0].storage.as_deref(), Some("nas"));
}

#[tokio::test]
async fn test_container_templates_filtered_by_node_and_storage() {
    let session = session_for(storage_cluster);
    let templates = ClusterAggregator::new(&session)
        .list_container_templates(Some("a"), Some("local"))
        .await
        .unwrap();
    assert_eq!(templates.items.len(), 1);
    assert_eq!(templates.items[0].storage_name, "local");
    assert_eq!(
        templates.items[0].file_name(),
        "debian-12-standard_12.2-1_amd64.tar.zst"
    );
}
