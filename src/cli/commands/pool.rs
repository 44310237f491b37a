use crate::{
    cli::{
        args::{PoolCommands, PoolMemberArgs},
        output::{Outcome, RenderContext},
    },
    core::domain::error::ProxmoxResult,
    normalize::projection::PoolMemberRow,
    operations::{PoolMembershipChange, PoolOperations},
    session::ClusterSession,
};
use serde_json::json;
use std::io::Write;

pub struct PoolCommand<'a> {
    session: &'a ClusterSession,
}

impl<'a> PoolCommand<'a> {
    pub fn new(session: &'a ClusterSession) -> Self {
        Self { session }
    }

    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &PoolCommands,
    ) -> ProxmoxResult<()> {
        let pools = PoolOperations::new(self.session);
        match command {
            PoolCommands::List => {
                let list = pools.list().await?;
                render.write(writer, &list, Some("Resource Pools"))
            }
            PoolCommands::Show { poolid } => {
                let pool = pools.show(poolid).await?;
                if render.is_json() {
                    return render.write(writer, &pool, None);
                }
                let summary = json!([{ "poolid": pool.id, "comment": pool.comment }]);
                render.write(writer, &summary, Some(&format!("Pool: {poolid}")))?;
                writeln!(writer)?;
                let members: Vec<PoolMemberRow> =
                    pool.members.iter().map(PoolMemberRow::from).collect();
                render.write(writer, &members, Some("Members"))
            }
            PoolCommands::Create { poolid, comment } => {
                pools.create(poolid, comment.as_deref()).await?;
                let outcome = Outcome::success(format!("Resource pool '{poolid}' created"))
                    .with("poolid", poolid);
                render.write_outcome(writer, &outcome)
            }
            PoolCommands::Update { poolid, comment } => {
                pools.update(poolid, comment.as_deref()).await?;
                let outcome = Outcome::success(format!("Resource pool '{poolid}' updated"))
                    .with("poolid", poolid);
                render.write_outcome(writer, &outcome)
            }
            PoolCommands::Delete { poolid } => {
                pools.delete(poolid).await?;
                let outcome = Outcome::success(format!("Resource pool '{poolid}' deleted"))
                    .with("poolid", poolid);
                render.write_outcome(writer, &outcome)
            }
            PoolCommands::AddMember(args) => {
                let change = PoolMembershipChange::add(args.vms.clone(), args.storages.clone());
                pools.manage_members(&args.poolid, &change).await?;
                render.write_outcome(writer, &membership_outcome(args, "added", "to"))
            }
            PoolCommands::RemoveMember(args) => {
                let change = PoolMembershipChange::remove(args.vms.clone(), args.storages.clone());
                pools.manage_members(&args.poolid, &change).await?;
                render.write_outcome(writer, &membership_outcome(args, "removed", "from"))
            }
        }
    }
}

fn membership_outcome(args: &PoolMemberArgs, verb: &str, preposition: &str) -> Outcome {
    let mut described = Vec::new();
    if !args.vms.is_empty() {
        described.push(format!("VMs {}", args.vms.join(", ")));
    }
    if !args.storages.is_empty() {
        described.push(format!("storages {}", args.storages.join(", ")));
    }
    Outcome::success(format!(
        "{} {verb} {preposition} pool '{}'",
        described.join(" and "),
        args.poolid
    ))
    .with("poolid", &args.poolid)
    .with(&format!("vms_{verb}"), &args.vms)
    .with(&format!("storages_{verb}"), &args.storages)
}
