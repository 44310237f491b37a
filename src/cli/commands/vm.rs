use super::report_skipped;
use crate::{
    aggregation::ClusterAggregator,
    cli::{
        args::{VmCloneArgs, VmCommands, VmCreateArgs},
        output::{Outcome, RenderContext},
    },
    core::domain::{
        error::{ProxmoxResult, ValidationError},
        value_object::VolumeSpec,
    },
    normalize::{
        projection::{GuestSummaryRow, VmTemplateRow},
        units::parse_size_gb,
    },
    operations::{CloneOptions, ProvisionOutcome, VmOperations, VmSpec},
    session::ClusterSession,
};
use std::io::Write;

pub struct VmCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> VmCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &VmCommands,
    ) -> ProxmoxResult<()> {
        let vms = VmOperations::new(self.session);
        match command {
            VmCommands::List {
                filter,
                templates_only,
                aggregation,
            } => {
                let aggregator = ClusterAggregator::with_policy(self.session, aggregation.policy());
                let node = filter.node.as_deref();
                let listed = if *templates_only {
                    aggregator.list_vm_templates(node).await?
                } else {
                    aggregator.list_vms(node).await?
                };
                report_skipped(render, &listed.skipped)?;

                if render.is_json() {
                    render.write(writer, &listed.items, None)
                } else {
                    let rows: Vec<GuestSummaryRow> =
                        listed.items.iter().map(GuestSummaryRow::from).collect();
                    render.write(writer, &rows, Some("Virtual Machines"))
                }
            }
            VmCommands::Templates {
                filter,
                aggregation,
            } => {
                let templates = ClusterAggregator::with_policy(self.session, aggregation.policy())
                    .list_vm_templates(filter.node.as_deref())
                    .await?;
                report_skipped(render, &templates.skipped)?;

                if render.is_json() {
                    render.write(writer, &templates.items, None)
                } else {
                    let rows: Vec<VmTemplateRow> =
                        templates.items.iter().map(VmTemplateRow::from).collect();
                    render.write(writer, &rows, Some("VM Templates"))
                }
            }
            VmCommands::Start(target) => {
                let task = vms.start(&target.node, target.vmid).await?;
                let outcome = Outcome::success(format!("VM {} start requested", target.vmid))
                    .with("vmid", target.vmid)
                    .with("task", &task);
                render.write_outcome(writer, &outcome)
            }
            VmCommands::Stop(target) => {
                let task = vms.stop(&target.node, target.vmid).await?;
                let outcome = Outcome::success(format!("VM {} stop requested", target.vmid))
                    .with("vmid", target.vmid)
                    .with("task", &task);
                render.write_outcome(writer, &outcome)
            }
            VmCommands::Status(target) => {
                let status = vms.current_status(&target.node, target.vmid).await?;
                render.write(writer, &status, Some(&format!("VM {}", target.vmid)))
            }
            VmCommands::Create(args) => {
                let outcome = vms
                    .create(&args.node, args.vmid, &vm_spec(args)?, args.start)
                    .await?;
                let message = format!("VM {} ({}) created on {}", args.vmid, args.name, args.node);
                render.write_outcome(writer, &provisioned(message, &outcome))
            }
            VmCommands::Clone(args) => {
                let outcome = vms
                    .clone_vm(
                        &args.node,
                        args.source_vmid,
                        args.new_vmid,
                        &args.name,
                        &clone_options(args),
                    )
                    .await?;
                let message = format!(
                    "VM {} cloned to {} ({}) on {}",
                    args.source_vmid, args.new_vmid, args.name, outcome.node
                );
                render.write_outcome(writer, &provisioned(message, &outcome))
            }
        }
    }
}

fn vm_spec(args: &VmCreateArgs) -> ProxmoxResult<VmSpec> {
    let disk = VolumeSpec::new(&args.storage, parse_disk_size(&args.disk_size)?)?;
    Ok(VmSpec {
        memory_mb: args.memory,
        cores: args.cores,
        sockets: args.sockets,
        iso: args.iso.clone(),
        iso_storage: args.iso_storage.clone(),
        ostype: args.ostype.clone(),
        network_bridge: args.network_bridge.clone(),
        network_model: args.network_model.clone(),
        ..VmSpec::new(&args.name, disk)
    })
}

fn clone_options(args: &VmCloneArgs) -> CloneOptions {
    CloneOptions {
        target_node: args.target_node.clone(),
        storage: args.storage.clone(),
        full: args.full,
        description: args.description.clone(),
        pool: args.pool.clone(),
        start_after_clone: args.start,
    }
}

fn provisioned(message: String, outcome: &ProvisionOutcome) -> Outcome {
    let mut result = Outcome::success(message)
        .with("vmid", outcome.vmid)
        .with("node", &outcome.node)
        .with("task", &outcome.task)
        .note(format!("Task: {}", outcome.task));
    if let Some(start_task) = &outcome.start_task {
        result = result
            .with("started", true)
            .with("start_task", start_task)
            .note("VM started");
    }
    result
}

/// Disk sizes on the command line are whole GB, or a size token with a unit
/// (`32G`, `512M`, `1T`) rounded up to the next GB.
fn parse_disk_size(token: &str) -> Result<u32, ValidationError> {
    if let Ok(gb) = token.trim().parse::<u32>() {
        return Ok(gb);
    }
    parse_size_gb(token)
        .filter(|gb| gb.is_finite() && *gb > 0.0 && *gb <= f64::from(u32::MAX))
        .map(|gb| gb.ceil() as u32)
        .ok_or_else(|| {
            ValidationError::field("disk_size", format!("Unrecognized disk size '{token}'"))
        })
}
