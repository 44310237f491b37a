use crate::{
    cli::{
        args::StorageCommands,
        output::{Outcome, RenderContext},
    },
    core::domain::error::ProxmoxResult,
    operations::{StorageOperations, StorageSpec},
    session::ClusterSession,
};
use std::io::Write;

pub struct StorageCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> StorageCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &StorageCommands,
    ) -> ProxmoxResult<()> {
        let storage = StorageOperations::new(self.session);
        match command {
            StorageCommands::List => {
                let list = storage.list().await?;
                render.write(writer, &list, Some("Storage"))
            }
            StorageCommands::Create(args) => {
                let spec = StorageSpec {
                    storage_type: args.storage_type.clone(),
                    content: args.content.clone(),
                    nodes: args.nodes.clone(),
                    shared: args.shared,
                    maxfiles: args.maxfiles,
                    prune_backups: args.prune_backups.clone(),
                    ..StorageSpec::new(&args.storage_id, &args.path)
                };
                storage.create(&spec).await?;
                let outcome = Outcome::success(format!(
                    "Storage '{}' created at {}",
                    spec.id, spec.path
                ))
                .with("storage", &spec.id)
                .with("path", &spec.path);
                render.write_outcome(writer, &outcome)
            }
        }
    }
}
