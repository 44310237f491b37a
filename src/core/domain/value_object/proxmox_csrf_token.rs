use crate::core::domain::error::ValidationError;

/// A Proxmox CSRF protection token, required on every mutating call made
/// with a ticket.
#[derive(Debug, Clone)]
pub struct ProxmoxCSRFToken {
    value: String,
}

impl ProxmoxCSRFToken {
    /// Creates a new CSRF token after validating its format.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_csrf_token(&value)?;
        Ok(Self { value })
    }

    /// Creates a new CSRF token without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self { value }
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Validates the `TIMESTAMP:SIGNATURE` shape of a CSRF token.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::field(
            "CSRFPreventionToken",
            "CSRF token cannot be empty",
        ));
    }
    match token.split_once(':') {
        Some((timestamp, signature))
            if !timestamp.is_empty()
                && timestamp.chars().all(|c| c.is_ascii_hexdigit())
                && !signature.is_empty() =>
        {
            Ok(())
        }
        _ => Err(ValidationError::Format(
            "Invalid CSRF token format: expected TIMESTAMP:SIGNATURE".to_string(),
        )),
    }
}
