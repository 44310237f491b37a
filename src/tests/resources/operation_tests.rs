use crate::{
    ApiMethod, ClusterSession, ProxmoxError, Secret, ValidationError, VolumeSpec,
    core::infrastructure::api_client::MockApiTransport,
    operations::{
        CloneOptions, ContainerOperations, ContainerSpec, PoolMembershipChange, PoolOperations,
        TaskWaiter, VmOperations,
    },
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CLONE_UPID: &str = "UPID:pve1:0000A1B2:0001C3D4:65000000:qmclone:9000:root@pam:";

fn silent_session() -> ClusterSession {
    let mut transport = MockApiTransport::new();
    transport.expect_request().never();
    ClusterSession::with_transport(Arc::new(transport))
}

fn fast_waiter() -> TaskWaiter {
    TaskWaiter::new(Duration::from_millis(10), Duration::from_secs(1))
}

#[tokio::test]
async fn test_pool_validation_happens_before_any_call() {
    let session = silent_session();
    let pools = PoolOperations::new(&session);

    let mixed = PoolMembershipChange {
        add_vms: vec!["100".to_string()],
        remove_storages: vec!["local".to_string()],
        ..Default::default()
    };
    assert!(matches!(
        pools.manage_members("prod", &mixed).await,
        Err(ProxmoxError::Validation(ValidationError::ConstraintViolation(_)))
    ));

    let empty = PoolMembershipChange::default();
    assert!(matches!(
        pools.manage_members("prod", &empty).await,
        Err(ProxmoxError::Validation(ValidationError::ConstraintViolation(_)))
    ));

    let malformed = PoolMembershipChange::add(vec!["100,101".to_string()], Vec::new());
    assert!(matches!(
        pools.manage_members("prod", &malformed).await,
        Err(ProxmoxError::Validation(ValidationError::Field { .. }))
    ));

    assert!(matches!(
        pools.update("prod", Some("")).await,
        Err(ProxmoxError::Validation(_))
    ));
    assert!(matches!(
        pools.delete("prod pool").await,
        Err(ProxmoxError::Validation(_))
    ));
}

#[tokio::test]
async fn test_pool_member_removal_sends_delete_flag() {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .withf(|method, path, params| {
            *method == ApiMethod::Put
                && path.to_string() == "pools/prod"
                && params.as_ref()
                    == Some(&json!({"vms": "100,101", "delete": 1}))
        })
        .times(1)
        .returning(|_, _, _| Ok(json!(null)));
    let session = ClusterSession::with_transport(Arc::new(transport));

    let change = PoolMembershipChange::remove(
        vec!["100".to_string(), "101".to_string()],
        Vec::new(),
    );
    PoolOperations::new(&session)
        .manage_members("prod", &change)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_container_create_allocates_rootfs() {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .withf(|method, path, params| {
            let Some(params) = params else {
                return false;
            };
            *method == ApiMethod::Post
                && path.to_string() == "nodes/pve1/lxc"
                && params["vmid"] == 201
                && params["rootfs"] == "local-lvm:8"
                && params["ostemplate"] == "local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst"
                && params["password"] == "s3cret"
                && params.get("nameserver").is_none()
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(json!("UPID:pve1:0000A1B3:0001C3D5:65000001:vzcreate:201:root@pam:"))
        });
    let session = ClusterSession::with_transport(Arc::new(transport));

    let spec = ContainerSpec {
        hostname: Some("proxy".to_string()),
        password: Some(Secret::new("s3cret")),
        ..ContainerSpec::new(VolumeSpec::new("local-lvm", 8).unwrap())
    };
    let task = ContainerOperations::new(&session)
        .create(
            "pve1",
            201,
            "local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst",
            &spec,
        )
        .await
        .unwrap();
    assert!(task.contains("vzcreate:201"));
}

#[tokio::test]
async fn test_clone_then_start_on_target_node() {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .withf(|method, path, _| {
            *method == ApiMethod::Post && path.to_string() == "nodes/pve1/qemu/9000/clone"
        })
        .times(1)
        .returning(|_, _, _| Ok(json!(CLONE_UPID)));
    transport
        .expect_request()
        .withf(|method, path, _| {
            *method == ApiMethod::Get && path.to_string().starts_with("nodes/pve1/tasks/")
        })
        .times(1)
        .returning(|_, _, _| Ok(json!({"status": "stopped", "exitstatus": "OK"})));
    transport
        .expect_request()
        .withf(|method, path, _| {
            *method == ApiMethod::Post && path.to_string() == "nodes/pve2/qemu/101/status/start"
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(json!("UPID:pve2:0000A1B4:0001C3D6:65000002:qmstart:101:root@pam:"))
        });
    let session = ClusterSession::with_transport(Arc::new(transport));

    let options = CloneOptions {
        target_node: Some("pve2".to_string()),
        full: true,
        start_after_clone: true,
        ..Default::default()
    };
    let outcome = VmOperations::with_waiter(&session, fast_waiter())
        .clone_vm("pve1", 9000, 101, "web-01", &options)
        .await
        .unwrap();

    assert_eq!(outcome.vmid, 101);
    assert_eq!(outcome.node, "pve2");
    assert_eq!(outcome.task, CLONE_UPID);
    assert!(outcome.start_task.is_some_and(|task| task.contains("qmstart")));
}

#[tokio::test]
async fn test_failed_clone_is_not_started() {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .withf(|_, path, _| path.to_string().ends_with("/clone"))
        .times(1)
        .returning(|_, _, _| Ok(json!(CLONE_UPID)));
    transport
        .expect_request()
        .withf(|_, path, _| path.to_string().contains("/tasks/"))
        .returning(|_, _, _| {
            Ok(json!({"status": "stopped", "exitstatus": "can't lock file"}))
        });
    transport
        .expect_request()
        .withf(|_, path, _| path.to_string().ends_with("/status/start"))
        .never();
    let session = ClusterSession::with_transport(Arc::new(transport));

    let options = CloneOptions {
        start_after_clone: true,
        ..Default::default()
    };
    let result = VmOperations::with_waiter(&session, fast_waiter())
        .clone_vm("pve1", 9000, 101, "web-01", &options)
        .await;
    match result {
        Err(ProxmoxError::RemoteApi { message, .. }) => {
            assert!(message.contains("can't lock file"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_clone_without_task_id_is_not_awaited() {
    let mut transport = MockApiTransport::new();
    transport
        .expect_request()
        .withf(|_, path, _| path.to_string().ends_with("/clone"))
        .times(1)
        .returning(|_, _, _| Ok(json!(null)));
    transport
        .expect_request()
        .withf(|_, path, _| !path.to_string().ends_with("/clone"))
        .never();
    let session = ClusterSession::with_transport(Arc::new(transport));

    let options = CloneOptions {
        start_after_clone: true,
        ..Default::default()
    };
    let result = VmOperations::with_waiter(&session, fast_waiter())
        .clone_vm("pve1", 9000, 101, "web-01", &options)
        .await;
    match result {
        Err(ProxmoxError::RemoteApi { message, .. }) => {
            assert!(message.contains("no task id"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_clone_onto_itself_is_rejected() {
    let session = silent_session();
    let result = VmOperations::new(&session)
        .clone_vm("pve1", 9000, 9000, "copy", &CloneOptions::default())
        .await;
    assert!(matches!(result, Err(ProxmoxError::Validation(_))));
}
