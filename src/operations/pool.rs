//! Resource pool management.

use crate::{
    core::domain::{
        error::{ProxmoxResult, ValidationError},
        model::{PoolRecord, RawRecord},
        value_object::{IdentifierList, validate_identifier},
    },
    normalize::normalize_pool,
    session::{ClusterSession, Resource},
};
use serde_json::{Map, Value, json};
use tracing::info;

/// A membership change for one pool.
///
/// Adding and removing are separate calls on the API side, so one change may
/// carry additions or removals but not both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMembershipChange {
    pub add_vms: Vec<String>,
    pub add_storages: Vec<String>,
    pub remove_vms: Vec<String>,
    pub remove_storages: Vec<String>,
}

impl PoolMembershipChange {
    pub fn add(vms: Vec<String>, storages: Vec<String>) -> Self {
        Self {
            add_vms: vms,
            add_storages: storages,
            ..Default::default()
        }
    }

    pub fn remove(vms: Vec<String>, storages: Vec<String>) -> Self {
        Self {
            remove_vms: vms,
            remove_storages: storages,
            ..Default::default()
        }
    }

    fn is_add(&self) -> bool {
        !self.add_vms.is_empty() || !self.add_storages.is_empty()
    }

    fn is_remove(&self) -> bool {
        !self.remove_vms.is_empty() || !self.remove_storages.is_empty()
    }

    /// Builds the `PUT pools/{id}` body.
    fn to_params(&self) -> Result<Value, ValidationError> {
        let (vms, storages, delete) = match (self.is_add(), self.is_remove()) {
            (true, true) => {
                return Err(ValidationError::ConstraintViolation(
                    "Members cannot be added and removed in the same call".to_string(),
                ));
            }
            (false, false) => {
                return Err(ValidationError::ConstraintViolation(
                    "Must specify at least one VM or storage".to_string(),
                ));
            }
            (true, false) => (&self.add_vms, &self.add_storages, false),
            (false, true) => (&self.remove_vms, &self.remove_storages, true),
        };

        let vms = IdentifierList::new("vms", vms)?;
        let storages = IdentifierList::new("storage", storages)?;

        let mut params = Map::new();
        if !vms.is_empty() {
            params.insert("vms".into(), json!(vms.joined()));
        }
        if !storages.is_empty() {
            params.insert("storage".into(), json!(storages.joined()));
        }
        if delete {
            params.insert("delete".into(), json!(1));
        }
        Ok(Value::Object(params))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoolOperations<'a> {
    session: &'a ClusterSession,
}

impl<'a> PoolOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> ProxmoxResult<Value> {
        self.session.pools().get().await
    }

    /// Pool details with normalized members.
    pub async fn show(&self, pool_id: &str) -> ProxmoxResult<PoolRecord> {
        let raw = self.pool(pool_id)?.get().await?;
        let record = RawRecord::from_value(raw).unwrap_or_default();
        Ok(normalize_pool(&record, pool_id))
    }

    pub async fn create(&self, pool_id: &str, comment: Option<&str>) -> ProxmoxResult<()> {
        validate_identifier("poolid", pool_id)?;
        let mut params = json!({ "poolid": pool_id });
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            params["comment"] = json!(comment);
        }
        self.session.pools().post(params).await?;
        info!(pool = %pool_id, "pool created");
        Ok(())
    }

    /// Updates the pool comment, the only mutable attribute.
    pub async fn update(&self, pool_id: &str, comment: Option<&str>) -> ProxmoxResult<()> {
        let comment = comment
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ValidationError::field("comment", "No update parameters provided"))?;
        self.pool(pool_id)?
            .put(json!({ "comment": comment }))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, pool_id: &str) -> ProxmoxResult<()> {
        self.pool(pool_id)?.delete().await?;
        info!(pool = %pool_id, "pool deleted");
        Ok(())
    }

    /// Adds or removes pool members.
    ///
    /// # Errors
    /// `ProxmoxError::Validation` when the change is empty, mixes additions
    /// with removals, or names a malformed identifier. Nothing is sent in
    /// that case.
    pub async fn manage_members(
        &self,
        pool_id: &str,
        change: &PoolMembershipChange,
    ) -> ProxmoxResult<()> {
        let params = change.to_params()?;
        self.pool(pool_id)?.put(params).await?;
        info!(pool = %pool_id, removed = change.is_remove(), "pool membership updated");
        Ok(())
    }

    fn pool(&self, pool_id: &str) -> ProxmoxResult<Resource<'a>> {
        validate_identifier("poolid", pool_id)?;
        Ok(self.session.pools().child(pool_id))
    }
}
