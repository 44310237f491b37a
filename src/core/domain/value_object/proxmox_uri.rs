use crate::core::domain::{
    error::ValidationError, value_object::resource_path::ResourcePath,
};
use url::Url;

/// Default port of the Proxmox VE API proxy.
const DEFAULT_API_PORT: u16 = 8006;

/// The base URL of a Proxmox VE API endpoint.
///
/// Accepts the three host spellings users put in their configuration:
///
/// - a bare hostname or address, e.g. `pve.example.com` → `https://pve.example.com:8006/`
/// - `host:port`, e.g. `10.0.0.5:443` → `https://10.0.0.5:443/`
/// - a full URL with a scheme, used verbatim, e.g. `http://127.0.0.1:9000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl {
    base: Url,
}

impl ProxmoxUrl {
    /// Parses and validates a host specification.
    pub fn from_host(host: &str) -> Result<Self, ValidationError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ValidationError::field("host", "Host cannot be empty"));
        }

        let base = if host.contains("://") {
            Url::parse(host)
                .map_err(|e| ValidationError::Format(format!("Invalid URL '{host}': {e}")))?
        } else {
            let mut url = Url::parse(&format!("https://{host}"))
                .map_err(|e| ValidationError::Format(format!("Invalid host '{host}': {e}")))?;
            if url.port().is_none() && !host.contains(':') {
                url.set_port(Some(DEFAULT_API_PORT)).map_err(|_| {
                    ValidationError::Format(format!("Cannot set a port on host '{host}'"))
                })?;
            }
            url
        };

        validate_url(&base)?;
        Ok(Self { base })
    }

    /// Returns the base URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    /// Builds the full `/api2/json/...` URL for a resource path.
    ///
    /// Each path segment is percent-encoded individually.
    pub fn api_url(&self, path: &ResourcePath) -> Result<Url, ValidationError> {
        path.validate()?;
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ValidationError::Format(format!("'{}' cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(["api2", "json"])
            .extend(path.segments());
        Ok(url)
    }
}

/// Validates scheme and host of an endpoint URL.
pub(crate) fn validate_url(url: &Url) -> Result<(), ValidationError> {
    if !matches!(url.scheme(), "https" | "http") {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: https, http",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::field("host", "URL has no host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_default_port() {
        let url = ProxmoxUrl::from_host("pve.example.com").unwrap();
        assert_eq!(url.as_str(), "https://pve.example.com:8006/");
    }

    #[test]
    fn test_host_with_port_is_kept() {
        let url = ProxmoxUrl::from_host("10.0.0.5:8443").unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.5:8443/");
    }

    #[test]
    fn test_full_url_is_verbatim() {
        let url = ProxmoxUrl::from_host("http://127.0.0.1:9000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_invalid_hosts() {
        assert!(ProxmoxUrl::from_host("").is_err());
        assert!(ProxmoxUrl::from_host("   ").is_err());
        assert!(ProxmoxUrl::from_host("ftp://pve.example.com").is_err());
        assert!(ProxmoxUrl::from_host("exam ple.com").is_err());
    }

    #[test]
    fn test_api_url_composition() {
        let url = ProxmoxUrl::from_host("pve.example.com").unwrap();
        let path = ResourcePath::root().join("nodes").join("pve1").join("qemu");
        assert_eq!(
            url.api_url(&path).unwrap().as_str(),
            "https://pve.example.com:8006/api2/json/nodes/pve1/qemu"
        );
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let url = ProxmoxUrl::from_host("pve.example.com").unwrap();
        let path = ResourcePath::root()
            .join("access")
            .join("users")
            .join("john doe@pve");
        assert_eq!(
            url.api_url(&path).unwrap().as_str(),
            "https://pve.example.com:8006/api2/json/access/users/john%20doe@pve"
        );
    }
}
