use crate::{
    cli::{
        args::ConfigCommands,
        output::{Outcome, RenderContext},
    },
    core::{
        domain::error::{ProxmoxError, ProxmoxResult},
        infrastructure::config_store::{ConfigStore, parse_scalar},
    },
};
use std::io::Write;

/// Reads and writes the configuration file. Never opens a session.
pub struct ConfigCommand<'a> {
    store: &'a ConfigStore,
}

impl<'a> ConfigCommand<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        render: &RenderContext,
        command: &ConfigCommands,
    ) -> ProxmoxResult<()> {
        match command {
            ConfigCommands::Show => {
                let tree = self.store.try_load()?;
                render.write(writer, tree.as_value(), Some("Configuration"))
            }
            ConfigCommands::Get { path } => {
                let tree = self.store.try_load()?;
                let value = tree.lookup(path).ok_or_else(|| {
                    ProxmoxError::Config(format!("No value configured at '{path}'"))
                })?;
                render.write(writer, value, None)
            }
            ConfigCommands::Set { path, value } => {
                let mut tree = self.store.try_load()?;
                tree.set(path, parse_scalar(value));
                self.store.save(&tree)?;
                let outcome = Outcome::success(format!("Set {path}"))
                    .with("path", path)
                    .with("file", self.store.path().display().to_string());
                render.write_outcome(writer, &outcome)
            }
            ConfigCommands::Path => {
                writeln!(writer, "{}", self.store.path().display())?;
                Ok(())
            }
        }
    }
}
