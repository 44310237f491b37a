//! The `proxmox-cli` command-line surface.
//!
//! [`run`] drives one invocation: it loads the configuration, picks the
//! output format, opens a session when the command needs one, and renders
//! either the result or the error.

pub mod args;
mod commands;
pub mod output;

use crate::{
    auth::application::credential_resolver::{ConnectionOverrides, CredentialResolver},
    core::{
        domain::error::ProxmoxResult,
        infrastructure::config_store::{ConfigStore, ConfigTree},
    },
    session::ClusterSession,
};
use args::{Cli, Commands};
use commands::{
    AclCommand, BackupCommand, ConfigCommand, ContainerCommand, GroupCommand, ImageCommand,
    NodeCommand, PoolCommand, RoleCommand, StorageCommand, TokenCommand, UserCommand, VmCommand,
};
use output::RenderContext;
use std::io::{self, Write};
use tracing::debug;

/// Runs one invocation and returns the process exit code.
pub async fn run(cli: Cli) -> u8 {
    let store = ConfigStore::new(cli.config.clone());
    let config = store.load();
    let render = RenderContext::resolve(cli.output, &config);
    colored::control::set_override(render.color());
    debug!(path = %store.path().display(), format = ?render.format(), "invocation configured");

    let mut stdout = io::stdout().lock();
    match execute(&cli, &store, &config, &render, &mut stdout).await {
        Ok(()) => 0,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            if let Err(write_error) = render.write_error(&mut stdout, &mut stderr, &error) {
                debug!(%write_error, "could not report error");
            }
            error.exit_code()
        }
    }
}

async fn execute<W: Write>(
    cli: &Cli,
    store: &ConfigStore,
    config: &ConfigTree,
    render: &RenderContext,
    writer: &mut W,
) -> ProxmoxResult<()> {
    if let Commands::Config { command } = &cli.command {
        return ConfigCommand::new(store).execute(writer, render, command);
    }

    let descriptor = CredentialResolver::new(cli.connection_overrides(), config)
        .resolve(&ConnectionOverrides::default())?;
    let session = ClusterSession::connect(&descriptor).await?;

    match &cli.command {
        Commands::Vm { command } => {
            VmCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Container { command } => {
            ContainerCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Image { command } => {
            ImageCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Node { command } => {
            NodeCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Storage { command } => {
            StorageCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Backup { command } => {
            BackupCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Pool { command } => {
            PoolCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::User { command } => {
            UserCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Group { command } => {
            GroupCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Role { command } => {
            RoleCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Acl { command } => {
            AclCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Token { command } => {
            TokenCommand::new(&session)
                .execute(writer, render, command)
                .await
        }
        Commands::Config { command } => ConfigCommand::new(store).execute(writer, render, command),
    }
}
