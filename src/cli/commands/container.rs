use super::report_skipped;
use crate::{
    aggregation::ClusterAggregator,
    cli::{
        args::{ContainerCommands, ContainerCreateArgs},
        output::{Outcome, RenderContext},
    },
    core::domain::{
        error::ProxmoxResult,
        value_object::{Secret, VolumeSpec},
    },
    normalize::projection::{ContainerTemplateRow, GuestSummaryRow},
    operations::{ContainerOperations, ContainerSpec},
    session::ClusterSession,
};
use std::io::Write;

pub struct ContainerCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> ContainerCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &ContainerCommands,
    ) -> ProxmoxResult<()> {
        let containers = ContainerOperations::new(self.session);
        match command {
            ContainerCommands::List {
                filter,
                aggregation,
            } => {
                let listed = ClusterAggregator::with_policy(self.session, aggregation.policy())
                    .list_containers(filter.node.as_deref())
                    .await?;
                report_skipped(render, &listed.skipped)?;

                if render.is_json() {
                    render.write(writer, &listed.items, None)
                } else {
                    let rows: Vec<GuestSummaryRow> =
                        listed.items.iter().map(GuestSummaryRow::from).collect();
                    render.write(writer, &rows, Some("Containers"))
                }
            }
            ContainerCommands::Start(target) => {
                let task = containers.start(&target.node, target.vmid).await?;
                let outcome =
                    Outcome::success(format!("Container {} start requested", target.vmid))
                        .with("vmid", target.vmid)
                        .with("task", &task);
                render.write_outcome(writer, &outcome)
            }
            ContainerCommands::Stop(target) => {
                let task = containers.stop(&target.node, target.vmid).await?;
                let outcome =
                    Outcome::success(format!("Container {} stop requested", target.vmid))
                        .with("vmid", target.vmid)
                        .with("task", &task);
                render.write_outcome(writer, &outcome)
            }
            ContainerCommands::Status(target) => {
                let status = containers
                    .current_status(&target.node, target.vmid)
                    .await?;
                render.write(writer, &status, Some(&format!("Container {}", target.vmid)))
            }
            ContainerCommands::Templates {
                filter,
                storage,
                aggregation,
            } => {
                let templates = ClusterAggregator::with_policy(self.session, aggregation.policy())
                    .list_container_templates(filter.node.as_deref(), storage.as_deref())
                    .await?;
                report_skipped(render, &templates.skipped)?;

                if render.is_json() {
                    render.write(writer, &templates.items, None)
                } else {
                    let rows: Vec<ContainerTemplateRow> = templates
                        .items
                        .iter()
                        .map(ContainerTemplateRow::from)
                        .collect();
                    render.write(writer, &rows, Some("Container Templates"))
                }
            }
            ContainerCommands::AvailableTemplates { node } => {
                let available = containers.available_templates(node).await?;
                render.write(writer, &available, Some("Available Templates"))
            }
            ContainerCommands::DownloadTemplate {
                template,
                node,
                storage,
            } => {
                let task = containers.download_template(node, storage, template).await?;
                let outcome = Outcome::success(format!(
                    "Download of '{template}' to {storage} started"
                ))
                .with("template", template)
                .with("storage", storage)
                .with("task", &task);
                render.write_outcome(writer, &outcome)
            }
            ContainerCommands::Create(args) => {
                let task = containers
                    .create(&args.node, args.vmid, &args.ostemplate, &container_spec(args)?)
                    .await?;
                let outcome = Outcome::success(format!(
                    "Container {} creation started on {}",
                    args.vmid, args.node
                ))
                .with("vmid", args.vmid)
                .with("node", &args.node)
                .with("task", &task)
                .note(format!("Task: {task}"));
                render.write_outcome(writer, &outcome)
            }
        }
    }
}

fn container_spec(args: &ContainerCreateArgs) -> ProxmoxResult<ContainerSpec> {
    let rootfs = VolumeSpec::new(&args.storage, args.rootfs_size)?;
    Ok(ContainerSpec {
        hostname: args.hostname.clone(),
        password: args.root_password.clone().map(Secret::new),
        memory_mb: args.memory,
        cores: args.cores,
        nameserver: args.nameserver.clone(),
        searchdomain: args.searchdomain.clone(),
        net0: args.net0.clone(),
        ..ContainerSpec::new(rootfs)
    })
}
