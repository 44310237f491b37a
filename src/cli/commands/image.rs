use super::report_skipped;
use crate::{
    aggregation::ClusterAggregator,
    cli::{
        args::{Format, ImageCommands},
        output::RenderContext,
    },
    core::domain::{
        error::{ProxmoxResult, ValidationError},
        model::RawRecord,
    },
    normalize::{
        parse_vm_template_detail,
        projection::{TemplateInfoRow, VmTemplateRow},
    },
    operations::VmOperations,
    session::ClusterSession,
};
use serde_json::json;
use std::io::Write;

pub struct ImageCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> ImageCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &ImageCommands,
    ) -> ProxmoxResult<()> {
        match command {
            ImageCommands::List {
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
            ImageCommands::Info { vmid, node } => {
                self.info(writer, render, *vmid, node.as_deref()).await
            }
        }
    }

    async fn info<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        vmid: u32,
        node: Option<&str>,
    ) -> ProxmoxResult<()> {
        let node = match node {
            Some(node) => node.to_string(),
            None => ClusterAggregator::new(self.session)
                .locate_template(vmid)
                .await?
                .ok_or_else(|| {
                    ValidationError::field("vmid", format!("Template {vmid} not found on any node"))
                })?,
        };

        let config = VmOperations::new(self.session).config(&node, vmid).await?;
        let config = RawRecord::from_value(config).unwrap_or_default();
        if !config.flag("template") {
            return Err(
                ValidationError::field("vmid", format!("VM {vmid} is not a template")).into(),
            );
        }
        let detail = parse_vm_template_detail(&config, vmid, &node);

        if matches!(render.format(), Format::Table | Format::Plain) {
            let summary = [TemplateInfoRow::from(&detail)];
            render.write(writer, &summary, Some(&format!("Template {vmid}")))?;
            if !detail.disks.is_empty() {
                writeln!(writer)?;
                let disks: Vec<_> = detail
                    .disks
                    .iter()
                    .map(|disk| {
                        json!({
                            "interface": disk.interface,
                            "storage": disk.storage,
                            "size": disk.size,
                        })
                    })
                    .collect();
                render.write(writer, &disks, Some("Disks"))?;
            }
            if !detail.networks.is_empty() {
                writeln!(writer)?;
                let networks: Vec<_> = detail
                    .networks
                    .iter()
                    .map(|net| {
                        json!({
                            "interface": net.interface,
                            "model": net.model,
                            "bridge": net.bridge,
                        })
                    })
                    .collect();
                render.write(writer, &networks, Some("Network"))?;
            }
            return Ok(());
        }
        render.write(writer, &detail, None)
    }
}
