use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::domain::{
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        model::ProxmoxAuth,
        value_object::{
            ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUrl, ProxmoxUsername, ResourcePath, Secret,
        },
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::debug;

/// Exchanges a username and password for a session ticket.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// # Errors
    /// - `ProxmoxError::Authentication` if the server rejects the credentials
    /// - `ProxmoxError::RemoteApi` on transport failures or unexpected statuses
    pub async fn execute(
        &self,
        http_client: &Client,
        base: &ProxmoxUrl,
        username: &ProxmoxUsername,
        password: &Secret,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let url = base.api_url(&ResourcePath::root().join("access").join("ticket"))?;
        let request = LoginRequest {
            username: username.as_str(),
            password: password.expose(),
        };
        debug!(user = %username, "requesting ticket");

        let response = http_client
            .post(url)
            .headers(self.default_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProxmoxError::transport(format!("Login request failed: {e}")))?;

        match response.status() {
            StatusCode::OK => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED => Err(ProxmoxError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::BAD_REQUEST => Err(ValidationError::Field {
                field: "request".to_string(),
                message: "Invalid request format".to_string(),
            }
            .into()),
            status => Err(ProxmoxError::RemoteApi {
                status_code: status.as_u16(),
                message: format!("Unexpected response status from login endpoint: {status}"),
            }),
        }
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            ProxmoxError::Authentication(format!("Failed to parse login response: {e}"))
        })?;

        let ticket = ProxmoxTicket::new(login_response.data.ticket)?;
        let csrf_token = ProxmoxCSRFToken::new(login_response.data.csrf_token)?;
        if let Some(canonical) = login_response.data.username {
            debug!(user = %canonical, "ticket issued");
        }

        Ok(ProxmoxAuth::ticket(ticket, csrf_token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::infrastructure::api_client::build_http_client;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    async fn login(server: &MockServer, password: &str) -> ProxmoxResult<ProxmoxAuth> {
        let client = build_http_client(true).unwrap();
        let base = ProxmoxUrl::from_host(&server.uri()).unwrap();
        let user = ProxmoxUsername::new("root@pam").unwrap();
        LoginService::new()
            .execute(&client, &base, &user, &Secret::new(password))
            .await
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .and(body_json(json!({"username": "root@pam", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "ticket": "PVE:root@pam:4EEC61E2::sig",
                    "CSRFPreventionToken": "4EEC61E2:abc123",
                    "username": "root@pam"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = login(&server, "secret").await.unwrap();
        match auth {
            ProxmoxAuth::Ticket { ticket, csrf_token } => {
                assert_eq!(
                    ticket.as_cookie_header(),
                    "PVEAuthCookie=PVE:root@pam:4EEC61E2::sig"
                );
                assert_eq!(csrf_token.as_str(), "4EEC61E2:abc123");
            }
            other => panic!("expected a ticket, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = login(&server, "wrong").await;
        assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_login_malformed_ticket_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"ticket": "garbage", "CSRFPreventionToken": "4EEC61E2:abc123"}
            })))
            .mount(&server)
            .await;

        let result = login(&server, "secret").await;
        assert!(matches!(result, Err(ProxmoxError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_unavailable_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = login(&server, "secret").await;
        assert!(matches!(
            result,
            Err(ProxmoxError::RemoteApi {
                status_code: 503,
                ..
            })
        ));
    }
}
