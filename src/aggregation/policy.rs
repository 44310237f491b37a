use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde::Serialize;
use tracing::debug;

/// What a cluster-wide read does when one node (or one storage on a node)
/// fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeFailure {
    /// Drop the failed source silently.
    #[default]
    Skip,
    /// Fail the whole aggregation with the first error, in node order.
    Abort,
    /// Drop the failed source and report it in [`Aggregated::skipped`].
    Collect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationPolicy {
    pub on_node_failure: NodeFailure,
}

impl AggregationPolicy {
    pub fn new(on_node_failure: NodeFailure) -> Self {
        Self { on_node_failure }
    }

    /// Folds per-source results, in order, into one aggregate.
    pub(crate) fn settle<T>(
        &self,
        results: impl IntoIterator<Item = (Source, ProxmoxResult<Aggregated<T>>)>,
    ) -> ProxmoxResult<Aggregated<T>> {
        let mut aggregate = Aggregated::default();
        for (source, result) in results {
            match result {
                Ok(part) => aggregate.merge(part),
                Err(error) => self.on_failure(&mut aggregate, source, error)?,
            }
        }
        Ok(aggregate)
    }

    fn on_failure<T>(
        &self,
        aggregate: &mut Aggregated<T>,
        source: Source,
        error: ProxmoxError,
    ) -> ProxmoxResult<()> {
        debug!(
            node = %source.node,
            storage = source.storage.as_deref().unwrap_or("-"),
            %error,
            "source failed during aggregation"
        );
        match self.on_node_failure {
            NodeFailure::Skip => Ok(()),
            NodeFailure::Abort => Err(error),
            NodeFailure::Collect => {
                aggregate.skipped.push(SkippedSource {
                    node: source.node,
                    storage: source.storage,
                    reason: error.to_string(),
                });
                Ok(())
            }
        }
    }
}

/// The node (and optionally storage) a partial result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Source {
    pub node: String,
    pub storage: Option<String>,
}

impl Source {
    pub fn node(node: &str) -> Self {
        Self {
            node: node.to_string(),
            storage: None,
        }
    }

    pub fn storage(node: &str, storage: &str) -> Self {
        Self {
            node: node.to_string(),
            storage: Some(storage.to_string()),
        }
    }
}

/// A source that contributed nothing because its query failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    pub reason: String,
}

/// Result of a cluster-wide read.
///
/// `skipped` is only populated under [`NodeFailure::Collect`]; under the
/// default policy an empty node and an unreachable node look the same.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedSource>,
}

impl<T> Aggregated<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            skipped: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn merge(&mut self, other: Aggregated<T>) {
        self.items.extend(other.items);
        self.skipped.extend(other.skipped);
    }

    #[must_use]
    pub fn filter(self, predicate: impl FnMut(&T) -> bool) -> Self {
        Self {
            items: self.items.into_iter().filter(predicate).collect(),
            skipped: self.skipped,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Aggregated<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}
