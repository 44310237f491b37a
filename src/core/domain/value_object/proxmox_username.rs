use crate::core::domain::error::ValidationError;
use std::fmt;

/// A validated Proxmox user id in `name@realm` form (e.g. `root@pam`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Creates a new username after validating its format.
    pub fn new(username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        validate_username(&username)?;
        Ok(Self(username))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the realm part (after the last `@`).
    #[must_use]
    pub fn realm(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, realm)| realm).unwrap_or("")
    }
}

impl fmt::Display for ProxmoxUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a user id: non-empty name and realm separated by `@`.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::field("user", "Username cannot be empty"));
    }
    if username.len() > 128 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 128 characters (got {})",
            username.len()
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c == '!') {
        return Err(ValidationError::Format(
            "Username cannot contain whitespace or '!'".to_string(),
        ));
    }
    match username.rsplit_once('@') {
        Some((name, realm)) if !name.is_empty() && !realm.is_empty() => Ok(()),
        _ => Err(ValidationError::Format(format!(
            "Username '{username}' must have the form name@realm"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("root@pam").is_ok());
        assert!(validate_username("john.doe@pve").is_ok());
        assert!(validate_username("svc@corp@ldap").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("root").is_err());
        assert!(validate_username("@pam").is_err());
        assert!(validate_username("root@").is_err());
        assert!(validate_username("ro ot@pam").is_err());
        assert!(validate_username("root@pam!token").is_err());
        assert!(validate_username(&format!("{}@pam", "a".repeat(130))).is_err());
    }

    #[test]
    fn test_username_realm() {
        let username = ProxmoxUsername::new("admin@pve").unwrap();
        assert_eq!(username.as_str(), "admin@pve");
        assert_eq!(username.realm(), "pve");
        assert_eq!(username.to_string(), "admin@pve");
    }
}
