use crate::{
    core::domain::{error::ProxmoxResult, value_object::validate_identifier},
    session::ClusterSession,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct NodeOperations<'a> {
    session: &'a ClusterSession,
}

impl<'a> NodeOperations<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    /// Detailed status of one node (`nodes/{node}/status`).
    pub async fn status(&self, node: &str) -> ProxmoxResult<Value> {
        validate_identifier("node", node)?;
        self.session.node(node).child("status").get().await
    }
}
