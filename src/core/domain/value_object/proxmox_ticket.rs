use crate::core::domain::error::ValidationError;

/// A Proxmox authentication ticket obtained from `access/ticket`.
#[derive(Clone)]
pub struct ProxmoxTicket {
    value: String,
}

impl ProxmoxTicket {
    /// Creates a new ticket after validating its format.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_ticket(&value)?;
        Ok(Self { value })
    }

    /// Creates a new ticket without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self { value }
    }

    /// Formats the ticket as a cookie header.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.value)
    }
}

impl std::fmt::Debug for ProxmoxTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxmoxTicket")
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Validates the format of a ticket string.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.is_empty() {
        return Err(ValidationError::field("ticket", "Ticket cannot be empty"));
    }
    let parts: Vec<&str> = ticket.split(':').collect();
    if parts.len() < 5 || parts[0] != "PVE" {
        return Err(ValidationError::Format(
            "Invalid ticket format: must start with 'PVE:' and have at least 5 parts".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ticket() {
        assert!(validate_ticket("PVE:root@pam:4EEC61E2::sig").is_ok());
        assert!(validate_ticket("").is_err());
        assert!(validate_ticket("PVE:root@pam").is_err());
        assert!(validate_ticket("XYZ:root@pam:4EEC61E2::sig").is_err());
    }

    #[test]
    fn test_cookie_header_and_redaction() {
        let ticket = ProxmoxTicket::new("PVE:root@pam:4EEC61E2::sig".to_string()).unwrap();
        assert_eq!(
            ticket.as_cookie_header(),
            "PVEAuthCookie=PVE:root@pam:4EEC61E2::sig"
        );
        assert!(!format!("{ticket:?}").contains("sig"));
    }
}
