use crate::{
    AuthMethod, ClusterAggregator, ClusterSession, ConfigTree, ConnectionDescriptor,
    ConnectionOverrides, CredentialResolver, ProxmoxError, Secret,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{any, body_json, header, method, path},
};

const TICKET: &str = "PVE:root@pam:4EEC61E2::sig";
const CSRF: &str = "4EEC61E2:abc123";

fn descriptor(server: &MockServer, auth: AuthMethod) -> ConnectionDescriptor {
    ConnectionDescriptor::new(server.uri(), "root@pam", auth, false).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "ticket": TICKET,
                "CSRFPreventionToken": CSRF,
                "username": "root@pam"
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_password_session_sends_ticket_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .and(header("cookie", format!("PVEAuthCookie={TICKET}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"node": "pve1", "status": "online", "cpu": 0.15, "uptime": 90061},
                {"node": "pve2", "status": "offline"}
            ]
        })))
        .mount(&server)
        .await;

    let auth = AuthMethod::Password(Secret::new("secret"));
    let session = ClusterSession::connect(&descriptor(&server, auth))
        .await
        .unwrap();
    let nodes = ClusterAggregator::new(&session).list_nodes().await.unwrap();

    let names: Vec<&str> = nodes.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["pve1", "pve2"]);
    assert!(nodes[0].is_online());
    assert!(!nodes[1].is_online());
}

#[tokio::test]
async fn test_mutating_call_carries_csrf_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/pools"))
        .and(header("csrfpreventiontoken", CSRF))
        .and(body_json(json!({"poolid": "prod", "comment": "production"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthMethod::Password(Secret::new("secret"));
    let session = ClusterSession::connect(&descriptor(&server, auth))
        .await
        .unwrap();
    crate::operations::PoolOperations::new(&session)
        .create("prod", Some("production"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_token_session_skips_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .and(header("authorization", "PVEAPIToken=root@pam!ci=1234-abcd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthMethod::ApiToken {
        name: "ci".to_string(),
        secret: Secret::new("1234-abcd"),
    };
    let session = ClusterSession::connect(&descriptor(&server, auth))
        .await
        .unwrap();
    let nodes = ClusterAggregator::new(&session).list_nodes().await.unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn test_rejected_password_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = AuthMethod::Password(Secret::new("wrong"));
    let result = ClusterSession::connect(&descriptor(&server, auth)).await;
    assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
}

#[tokio::test]
async fn test_expired_token_on_resource_call_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = AuthMethod::ApiToken {
        name: "ci".to_string(),
        secret: Secret::new("revoked"),
    };
    let session = ClusterSession::connect(&descriptor(&server, auth))
        .await
        .unwrap();
    let result = ClusterAggregator::new(&session).list_nodes().await;
    assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut tree = ConfigTree::defaults();
    tree.set("proxmox.host", server.uri());
    tree.set("proxmox.token_name", "ci");

    let result = CredentialResolver::new(ConnectionOverrides::default(), &tree)
        .resolve(&ConnectionOverrides::default());
    assert!(matches!(result, Err(ProxmoxError::MissingCredentials(_))));
}

#[tokio::test]
async fn test_empty_host_is_config_error() {
    let descriptor = ConnectionDescriptor::new(
        "",
        "root@pam",
        AuthMethod::Password(Secret::new("secret")),
        true,
    )
    .unwrap();
    let result = ClusterSession::connect(&descriptor).await;
    assert!(matches!(result, Err(ProxmoxError::Config(_))));
}

#[tokio::test]
async fn test_remote_error_keeps_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve9/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("hostname lookup 'pve9' failed"))
        .mount(&server)
        .await;

    let auth = AuthMethod::ApiToken {
        name: "ci".to_string(),
        secret: Secret::new("1234-abcd"),
    };
    let session = ClusterSession::connect(&descriptor(&server, auth))
        .await
        .unwrap();
    let result = crate::operations::NodeOperations::new(&session)
        .status("pve9")
        .await;

    match result {
        Err(ProxmoxError::RemoteApi {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 500);
            assert!(message.contains("pve9"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
