//! One authenticated connection to the cluster API.
//!
//! A [`ClusterSession`] is opened once per invocation and handed to the
//! aggregation and operation layers. It is a thin transport: no retries, no
//! caching, no re-authentication.
//!
//! ```no_run
//! use proxmox_cli::{AuthMethod, ClusterSession, ConnectionDescriptor, ProxmoxResult, Secret};
//!
//! # async fn run() -> ProxmoxResult<()> {
//! let descriptor = ConnectionDescriptor::new(
//!     "pve.example.com",
//!     "root@pam",
//!     AuthMethod::Password(Secret::new("secret")),
//!     true,
//! )?;
//! let session = ClusterSession::connect(&descriptor).await?;
//! let nodes = session.nodes().get().await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::application::service::login_service::LoginService,
    core::{
        domain::{
            error::{ProxmoxError, ProxmoxResult},
            model::{AuthMethod, ConnectionDescriptor, ProxmoxAuth},
            value_object::{ProxmoxUrl, ResourcePath},
        },
        infrastructure::api_client::{ApiMethod, ApiTransport, HttpTransport, build_http_client},
    },
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An authenticated session.
#[derive(Clone)]
pub struct ClusterSession {
    transport: Arc<dyn ApiTransport>,
}

impl ClusterSession {
    /// Opens a session: logs in for password auth, or prepares the token
    /// header for API-token auth.
    ///
    /// # Errors
    /// - `ProxmoxError::Config` if the host is empty or not a valid endpoint
    /// - `ProxmoxError::Authentication` if the server rejects the password
    /// - `ProxmoxError::RemoteApi` if the login endpoint cannot be reached
    pub async fn connect(descriptor: &ConnectionDescriptor) -> ProxmoxResult<Self> {
        if descriptor.host().trim().is_empty() {
            return Err(ProxmoxError::Config(
                "No host configured; pass --host or set proxmox.host".to_string(),
            ));
        }
        let base = ProxmoxUrl::from_host(descriptor.host())
            .map_err(|e| ProxmoxError::Config(format!("Invalid host: {e}")))?;
        let http_client = build_http_client(descriptor.verify_ssl())?;

        let auth = match descriptor.auth() {
            AuthMethod::Password(password) => {
                LoginService::new()
                    .execute(&http_client, &base, descriptor.user(), password)
                    .await?
            }
            AuthMethod::ApiToken { name, secret } => {
                ProxmoxAuth::api_token(descriptor.user(), name, secret)
            }
        };
        debug!(endpoint = %base.as_str(), user = %descriptor.user(), "session opened");

        Ok(Self::with_transport(Arc::new(HttpTransport::new(
            http_client,
            base,
            auth,
        ))))
    }

    /// Wraps an already authenticated transport.
    pub fn with_transport(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Accessor for an arbitrary top-level resource.
    pub fn resource(&self, segment: impl fmt::Display) -> Resource<'_> {
        Resource {
            session: self,
            path: ResourcePath::root().join(segment),
        }
    }

    pub fn nodes(&self) -> Resource<'_> {
        self.resource("nodes")
    }

    /// `nodes/{name}`
    pub fn node(&self, name: &str) -> Resource<'_> {
        self.nodes().child(name)
    }

    pub fn cluster(&self) -> Resource<'_> {
        self.resource("cluster")
    }

    /// Cluster-wide storage definitions (`storage`).
    pub fn storage(&self) -> Resource<'_> {
        self.resource("storage")
    }

    pub fn pools(&self) -> Resource<'_> {
        self.resource("pools")
    }

    pub fn access(&self) -> Resource<'_> {
        self.resource("access")
    }

    async fn call(
        &self,
        method: ApiMethod,
        path: &ResourcePath,
        params: Option<Value>,
    ) -> ProxmoxResult<Value> {
        self.transport.request(method, path, params).await
    }
}

impl fmt::Debug for ClusterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSession").finish_non_exhaustive()
    }
}

/// A path-addressed API resource bound to a session.
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    session: &'a ClusterSession,
    path: ResourcePath,
}

impl<'a> Resource<'a> {
    /// Returns the sub-resource `{self}/{segment}`.
    #[must_use]
    pub fn child(&self, segment: impl fmt::Display) -> Resource<'a> {
        Resource {
            session: self.session,
            path: self.path.clone().join(segment),
        }
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub async fn get(&self) -> ProxmoxResult<Value> {
        self.session.call(ApiMethod::Get, &self.path, None).await
    }

    /// GET with query parameters.
    pub async fn get_with(&self, params: Value) -> ProxmoxResult<Value> {
        self.session
            .call(ApiMethod::Get, &self.path, Some(params))
            .await
    }

    pub async fn post(&self, params: Value) -> ProxmoxResult<Value> {
        self.session
            .call(ApiMethod::Post, &self.path, Some(params))
            .await
    }

    pub async fn put(&self, params: Value) -> ProxmoxResult<Value> {
        self.session
            .call(ApiMethod::Put, &self.path, Some(params))
            .await
    }

    pub async fn delete(&self) -> ProxmoxResult<Value> {
        self.session.call(ApiMethod::Delete, &self.path, None).await
    }

    /// DELETE with query parameters.
    pub async fn delete_with(&self, params: Value) -> ProxmoxResult<Value> {
        self.session
            .call(ApiMethod::Delete, &self.path, Some(params))
            .await
    }
}
