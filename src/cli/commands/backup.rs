use super::report_skipped;
use crate::{
    aggregation::ClusterAggregator,
    cli::{args::BackupCommands, output::RenderContext},
    core::domain::error::ProxmoxResult,
    normalize::projection::BackupRow,
    session::ClusterSession,
};
use std::io::Write;

pub struct BackupCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> BackupCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &BackupCommands,
    ) -> ProxmoxResult<()> {
        match command {
            BackupCommands::List {
                filter,
                storage,
                aggregation,
            } => {
                let backups = ClusterAggregator::with_policy(self.session, aggregation.policy())
                    .list_backups(filter.node.as_deref(), storage.as_deref())
                    .await?;
                report_skipped(render, &backups.skipped)?;

                if render.is_json() {
                    render.write(writer, &backups.items, None)
                } else {
                    let rows: Vec<BackupRow> = backups.items.iter().map(BackupRow::from).collect();
                    render.write(writer, &rows, Some("Backups"))
                }
            }
        }
    }
}
