//! Cluster-wide storage definitions.

use crate::{
    core::domain::{
        error::{ProxmoxResult, ValidationError},
        value_object::validate_identifier,
    },
    session::ClusterSession,
};
use serde_json::{Map, Value, json};
use tracing::info;

/// A new storage definition. Only directory-style backends that are
/// addressed by a filesystem path are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSpec {
    pub id: String,
    pub storage_type: String,
    pub path: String,
    /// Comma-separated content types, e.g. `iso,vztmpl`.
    pub content: Option<String>,
    /// Comma-separated node restriction.
    pub nodes: Option<String>,
    pub shared: bool,
    pub maxfiles: Option<u32>,
    /// Retention options, e.g. `keep-last=3,keep-weekly=2`.
    pub prune_backups: Option<String>,
}

impl StorageSpec {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            storage_type: "dir".to_string(),
            path: path.into(),
            content: None,
            nodes: None,
            shared: false,
            maxfiles: None,
            prune_backups: None,
        }
    }

    fn to_params(&self) -> Result<Value, ValidationError> {
        validate_identifier("storage", &self.id)?;
        validate_identifier("type", &self.storage_type)?;
        if self.path.is_empty() {
            return Err(ValidationError::field("path", "Path cannot be empty"));
        }

        let mut params = Map::new();
        params.insert("storage".into(), json!(self.id));
        params.insert("type".into(), json!(self.storage_type));
        params.insert("path".into(), json!(self.path));
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            params.insert("content".into(), json!(content));
        }
        if let Some(nodes) = self.nodes.as_deref().filter(|n| !n.is_empty()) {
            params.insert("nodes".into(), json!(nodes));
        }
        if self.shared {
            params.insert("shared".into(), json!(1));
        }
        if let Some(maxfiles) = self.maxfiles {
            params.insert("maxfiles".into(), json!(maxfiles));
        }
        if let Some(prune) = self.prune_backups.as_deref().filter(|p| !p.is_empty()) {
            params.insert("prune-backups".into(), json!(prune));
        }
        Ok(Value::Object(params))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StorageOperations<'a> {
    session: &'a ClusterSession,
}

impl<'a> StorageOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> ProxmoxResult<Value> {
        self.session.storage().get().await
    }

    pub async fn create(&self, spec: &StorageSpec) -> ProxmoxResult<()> {
        self.session.storage().post(spec.to_params()?).await?;
        info!(storage = %spec.id, path = %spec.path, "storage created");
        Ok(())
    }
}
