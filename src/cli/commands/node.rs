use crate::{
    aggregation::ClusterAggregator,
    cli::{args::NodeCommands, output::RenderContext},
    core::domain::error::ProxmoxResult,
    normalize::projection::NodeRow,
    operations::NodeOperations,
    session::ClusterSession,
};
use std::io::Write;

pub struct NodeCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> NodeCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &NodeCommands,
    ) -> ProxmoxResult<()> {
        match command {
            NodeCommands::List => {
                let nodes = ClusterAggregator::new(self.session).list_nodes().await?;
                if render.is_json() {
                    render.write(writer, &nodes, None)
                } else {
                    let rows: Vec<NodeRow> = nodes.iter().map(NodeRow::from).collect();
                    render.write(writer, &rows, Some("Nodes"))
                }
            }
            NodeCommands::Status { node } => {
                let status = NodeOperations::new(self.session).status(node).await?;
                render.write(writer, &status, Some(&format!("Node: {node}")))
            }
        }
    }
}
