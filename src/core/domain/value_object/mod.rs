mod identifier;
mod proxmox_csrf_token;
mod proxmox_ticket;
mod proxmox_uri;
mod proxmox_username;
mod resource_path;
mod secret;

pub use identifier::{IdentifierList, VolumeSpec};
pub use proxmox_csrf_token::ProxmoxCSRFToken;
pub use proxmox_ticket::ProxmoxTicket;
pub use proxmox_uri::ProxmoxUrl;
pub use proxmox_username::ProxmoxUsername;
pub use resource_path::ResourcePath;
pub use secret::Secret;

// Re-export validation functions for internal use
pub(crate) use identifier::validate_identifier;
