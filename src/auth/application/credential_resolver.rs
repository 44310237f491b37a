//! Merges connection parameters from call-site overrides, invocation flags,
//! the configuration file and built-in defaults.

use crate::core::{
    domain::{
        error::ProxmoxResult,
        model::{AuthMethod, ConnectionDescriptor},
    },
    infrastructure::config_store::ConfigTree,
};
use tracing::debug;

const DEFAULT_HOST: &str = "";
const DEFAULT_USER: &str = "root@pam";
const DEFAULT_VERIFY_SSL: bool = true;

/// One tier of connection overrides. Unset and empty values fall through to
/// the next tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token_name: Option<String>,
    pub token_value: Option<String>,
    pub verify_ssl: Option<bool>,
}

/// Resolves a [`ConnectionDescriptor`] with precedence
/// explicit > invocation > config tree > default.
#[derive(Debug, Clone)]
pub struct CredentialResolver<'a> {
    invocation: ConnectionOverrides,
    config: &'a ConfigTree,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(invocation: ConnectionOverrides, config: &'a ConfigTree) -> Self {
        Self { invocation, config }
    }

    /// # Errors
    /// - `ProxmoxError::MissingCredentials` if neither a complete API token nor a
    ///   password resolves to a non-empty value
    /// - `ProxmoxError::Validation` if the resolved user is not `name@realm`
    pub fn resolve(&self, explicit: &ConnectionOverrides) -> ProxmoxResult<ConnectionDescriptor> {
        let pick = |select: fn(&ConnectionOverrides) -> Option<&String>, key: &str| {
            [select(explicit), select(&self.invocation)]
                .into_iter()
                .flatten()
                .find(|value| !value.is_empty())
                .cloned()
                .or_else(|| self.config_value(key))
        };

        let password = pick(|o| o.password.as_ref(), "password");
        let token_name = pick(|o| o.token_name.as_ref(), "token_name");
        let token_value = pick(|o| o.token_value.as_ref(), "token_value");

        let auth = AuthMethod::select(
            password.as_deref(),
            token_name.as_deref(),
            token_value.as_deref(),
        )?;

        let host = pick(|o| o.host.as_ref(), "host").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let user = pick(|o| o.user.as_ref(), "user").unwrap_or_else(|| DEFAULT_USER.to_string());
        let verify_ssl = explicit
            .verify_ssl
            .or(self.invocation.verify_ssl)
            .or_else(|| self.config.get_bool("proxmox.verify_ssl"))
            .unwrap_or(DEFAULT_VERIFY_SSL);

        if !verify_ssl {
            debug!(%host, "TLS certificate verification disabled");
        }

        ConnectionDescriptor::new(host, &user, auth, verify_ssl)
    }

    fn config_value(&self, key: &str) -> Option<String> {
        self.config
            .get_str(&format!("proxmox.{key}"))
            .filter(|value| !value.is_empty())
    }
}
