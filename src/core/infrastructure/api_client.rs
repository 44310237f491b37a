//! HTTP transport that attaches authentication and unwraps API responses.

use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    model::ProxmoxAuth,
    value_object::{ProxmoxUrl, ResourcePath},
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fixed timeout applied to every request and every connect attempt.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The four verbs the API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    /// Whether the call changes remote state (and needs a CSRF token).
    pub fn is_mutating(self) -> bool {
        !matches!(self, ApiMethod::Get)
    }

    /// Whether parameters travel as a JSON body rather than a query string.
    pub fn has_body(self) -> bool {
        matches!(self, ApiMethod::Post | ApiMethod::Put)
    }

    fn as_reqwest(self) -> Method {
        match self {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
        })
    }
}

/// One authenticated round trip against the API.
///
/// Implementations return the content of the response's `data` member.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(
        &self,
        method: ApiMethod,
        path: &ResourcePath,
        params: Option<Value>,
    ) -> ProxmoxResult<Value>;
}

/// Builds the shared `reqwest` client.
///
/// # Errors
/// Returns `ProxmoxError::Config` if the TLS backend cannot be initialised.
pub fn build_http_client(verify_ssl: bool) -> ProxmoxResult<Client> {
    Client::builder()
        .danger_accept_invalid_certs(!verify_ssl)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ProxmoxError::Config(format!("Failed to build HTTP client: {e}")))
}

/// [`ApiTransport`] over HTTPS.
///
/// Requests are sent exactly once; there is no retry, caching or ticket
/// refresh. A `401` on any call surfaces as `ProxmoxError::Authentication`.
#[derive(Debug)]
pub struct HttpTransport {
    http_client: Client,
    base: ProxmoxUrl,
    auth: ProxmoxAuth,
}

impl HttpTransport {
    pub fn new(http_client: Client, base: ProxmoxUrl, auth: ProxmoxAuth) -> Self {
        Self {
            http_client,
            base,
            auth,
        }
    }

    fn build_url(
        &self,
        method: ApiMethod,
        path: &ResourcePath,
        params: Option<&Value>,
    ) -> ProxmoxResult<Url> {
        let mut url = self.base.api_url(path)?;
        if !method.has_body() {
            if let Some(Value::Object(map)) = params {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in map {
                    if let Some(text) = query_value(value) {
                        pairs.append_pair(key, &text);
                    }
                }
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(
        &self,
        method: ApiMethod,
        path: &ResourcePath,
        params: Option<Value>,
    ) -> ProxmoxResult<Value> {
        let url = self.build_url(method, path, params.as_ref())?;
        debug!(%method, %path, "api request");

        let headers = self
            .auth
            .headers(method.is_mutating())
            .map_err(|e| ProxmoxError::Authentication(format!("Invalid credential header: {e}")))?;

        let mut builder = self
            .http_client
            .request(method.as_reqwest(), url)
            .headers(headers);
        if method.has_body() {
            builder = builder.json(&params.unwrap_or_else(|| Value::Object(Default::default())));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProxmoxError::transport(format!("HTTP request failed: {e}")))?;

        unwrap_response(response).await
    }
}

/// Maps the HTTP status to an error and extracts `data` from a successful body.
pub(crate) async fn unwrap_response(response: Response) -> ProxmoxResult<Value> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ProxmoxError::Authentication(error_message(status, response).await));
    }

    if !status.is_success() {
        return Err(ProxmoxError::RemoteApi {
            status_code: status.as_u16(),
            message: error_message(status, response).await,
        });
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| ProxmoxError::transport(format!("Failed to parse response: {e}")))?;

    Ok(match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    })
}

/// Proxmox puts the human-readable reason in the status line and parameter
/// errors in an `errors` object.
async fn error_message(status: StatusCode, response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<Value>(&body).ok();

    let details = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_object)
        .map(|errors| {
            errors
                .iter()
                .map(|(field, message)| {
                    format!("{field}: {}", message.as_str().unwrap_or_default().trim())
                })
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|s| !s.is_empty());

    let reason = status.canonical_reason().unwrap_or("unknown error");
    match details {
        Some(details) => format!("{reason}: {details}"),
        None if !body.trim().is_empty() && parsed.is_none() => body.trim().to_string(),
        None => reason.to_string(),
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
