//! Typed builders for the comma- and colon-delimited parameter strings the
//! Proxmox API expects (`vms=100,101`, `rootfs=local-lvm:8`).
//!
//! Identifiers are rejected before formatting when they contain a delimiter,
//! so a malformed value never reaches the remote side.

use crate::core::domain::error::ValidationError;
use std::fmt;

const FORBIDDEN: [char; 3] = [',', ':', '='];

/// Validates a single identifier for use inside a delimited parameter.
pub(crate) fn validate_identifier(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::field(field, "Identifier cannot be empty"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| FORBIDDEN.contains(c) || c.is_whitespace())
    {
        return Err(ValidationError::field(
            field,
            format!("Identifier '{value}' contains forbidden character {c:?}"),
        ));
    }
    Ok(())
}

/// A validated list of identifiers, rendered comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierList {
    items: Vec<String>,
}

impl IdentifierList {
    /// Builds a list, validating every identifier.
    pub fn new<I, S>(field: &str, items: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let items = items
            .into_iter()
            .map(|item| {
                let item = item.to_string();
                validate_identifier(field, &item).map(|()| item)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The comma-joined wire form, e.g. `100,101`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.items.join(",")
    }
}

/// A volume allocation of the form `{storage}:{size_gb}`, used for container
/// root filesystems and VM disks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    storage: String,
    size_gb: u32,
}

impl VolumeSpec {
    pub fn new(storage: impl Into<String>, size_gb: u32) -> Result<Self, ValidationError> {
        let storage = storage.into();
        validate_identifier("storage", &storage)?;
        if size_gb == 0 {
            return Err(ValidationError::field(
                "size",
                "Volume size must be at least 1 GB",
            ));
        }
        Ok(Self { storage, size_gb })
    }

    pub fn storage(&self) -> &str {
        &self.storage
    }

    pub fn size_gb(&self) -> u32 {
        self.size_gb
    }
}

impl fmt::Display for VolumeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage, self.size_gb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_list_joined() {
        let list = IdentifierList::new("vms", [100, 101, 102]).unwrap();
        assert_eq!(list.joined(), "100,101,102");
        assert!(!list.is_empty());

        let empty = IdentifierList::new::<_, String>("vms", []).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.joined(), "");
    }

    #[test]
    fn test_identifier_list_rejects_delimiters() {
        assert!(IdentifierList::new("storage", ["local", "nfs,backup"]).is_err());
        assert!(IdentifierList::new("storage", ["local:iso"]).is_err());
        assert!(IdentifierList::new("storage", ["a b"]).is_err());
        assert!(IdentifierList::new("storage", [""]).is_err());
    }

    #[test]
    fn test_volume_spec() {
        let spec = VolumeSpec::new("local-lvm", 8).unwrap();
        assert_eq!(spec.to_string(), "local-lvm:8");
        assert!(VolumeSpec::new("local:lvm", 8).is_err());
        assert!(VolumeSpec::new("local-lvm", 0).is_err());
    }
}
