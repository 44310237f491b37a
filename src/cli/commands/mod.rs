//! Command executors, one per subcommand group.
//!
//! Each executor turns parsed arguments into library calls and hands the
//! result to the [`RenderContext`](super::output::RenderContext).

mod access;
mod backup;
mod config;
mod container;
mod image;
mod node;
mod pool;
mod storage;
mod vm;

pub use access::{AclCommand, GroupCommand, RoleCommand, TokenCommand, UserCommand};
pub use backup::BackupCommand;
pub use config::ConfigCommand;
pub use container::ContainerCommand;
pub use image::ImageCommand;
pub use node::NodeCommand;
pub use pool::PoolCommand;
pub use storage::StorageCommand;
pub use vm::VmCommand;

use super::{args::AggregationArgs, output::RenderContext};
use crate::aggregation::{AggregationPolicy, NodeFailure, SkippedSource};
use std::io;

impl AggregationArgs {
    pub fn policy(&self) -> AggregationPolicy {
        let on_node_failure = if self.strict {
            NodeFailure::Abort
        } else if self.report_skipped {
            NodeFailure::Collect
        } else {
            NodeFailure::Skip
        };
        AggregationPolicy::new(on_node_failure)
    }
}

/// Lists sources dropped from a cluster-wide read on stderr.
fn report_skipped(render: &RenderContext, skipped: &[SkippedSource]) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    for source in skipped {
        let location = match &source.storage {
            Some(storage) => format!("{}/{storage}", source.node),
            None => source.node.clone(),
        };
        render.write_warning(&mut stderr, &format!("skipped {location}: {}", source.reason))?;
    }
    Ok(())
}
