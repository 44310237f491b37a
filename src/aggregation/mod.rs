//! Cluster-wide reads built on top of [`ClusterSession`](crate::ClusterSession).

mod cluster_aggregator;
mod policy;

pub use cluster_aggregator::ClusterAggregator;
pub use policy::{Aggregated, AggregationPolicy, NodeFailure, SkippedSource};
