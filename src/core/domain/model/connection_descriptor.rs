//! Connection parameters for one CLI invocation.
//!
//! A [`ConnectionDescriptor`] is built once from the resolved configuration
//! tiers and is immutable afterwards.

use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    value_object::{ProxmoxUsername, Secret},
};

/// How the session authenticates against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Username/password exchanged for a ticket at connect time.
    Password(Secret),
    /// A pre-issued API token, sent with every request.
    ApiToken { name: String, secret: Secret },
}

impl AuthMethod {
    /// Picks the authentication method from the resolved credential values.
    ///
    /// An API token wins when both its name and value are non-empty;
    /// otherwise a non-empty password is used.
    ///
    /// # Errors
    /// Returns `ProxmoxError::MissingCredentials` when neither is usable.
    pub fn select(
        password: Option<&str>,
        token_name: Option<&str>,
        token_value: Option<&str>,
    ) -> ProxmoxResult<Self> {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        if let (Some(name), Some(secret)) = (non_empty(token_name), non_empty(token_value)) {
            return Ok(AuthMethod::ApiToken {
                name: name.to_string(),
                secret: Secret::new(secret),
            });
        }
        if let Some(password) = non_empty(password) {
            return Ok(AuthMethod::Password(Secret::new(password)));
        }
        Err(ProxmoxError::MissingCredentials(
            "Either password or API token (name and value) must be provided".to_string(),
        ))
    }
}

/// Everything needed to open a [`ClusterSession`](crate::ClusterSession).
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    host: String,
    user: ProxmoxUsername,
    auth: AuthMethod,
    verify_ssl: bool,
}

impl ConnectionDescriptor {
    /// # Errors
    /// Returns `ProxmoxError::Validation` when `user` is not of the form `name@realm`.
    pub fn new(
        host: impl Into<String>,
        user: &str,
        auth: AuthMethod,
        verify_ssl: bool,
    ) -> ProxmoxResult<Self> {
        Ok(Self {
            host: host.into(),
            user: ProxmoxUsername::new(user)?,
            auth,
            verify_ssl,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &ProxmoxUsername {
        &self.user
    }

    pub fn auth(&self) -> &AuthMethod {
        &self.auth
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wins_over_password() {
        let auth = AuthMethod::select(Some("secret"), Some("ci"), Some("uuid")).unwrap();
        assert_eq!(
            auth,
            AuthMethod::ApiToken {
                name: "ci".to_string(),
                secret: Secret::new("uuid"),
            }
        );
    }

    #[test]
    fn test_incomplete_token_falls_back_to_password() {
        let auth = AuthMethod::select(Some("secret"), Some("ci"), Some("")).unwrap();
        assert_eq!(auth, AuthMethod::Password(Secret::new("secret")));

        let auth = AuthMethod::select(Some("secret"), None, Some("uuid")).unwrap();
        assert_eq!(auth, AuthMethod::Password(Secret::new("secret")));
    }

    #[test]
    fn test_no_credentials_fails() {
        let result = AuthMethod::select(None, None, None);
        assert!(matches!(result, Err(ProxmoxError::MissingCredentials(_))));

        let result = AuthMethod::select(Some(""), Some(""), None);
        assert!(matches!(result, Err(ProxmoxError::MissingCredentials(_))));
    }

    #[test]
    fn test_descriptor_validates_user() {
        let auth = AuthMethod::Password(Secret::new("secret"));
        assert!(ConnectionDescriptor::new("pve", "root@pam", auth.clone(), true).is_ok());
        assert!(matches!(
            ConnectionDescriptor::new("pve", "root", auth, true),
            Err(ProxmoxError::Validation(_))
        ));
    }
}
