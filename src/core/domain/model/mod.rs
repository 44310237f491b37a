mod connection_descriptor;
mod guest;
mod node;
mod pool;
mod proxmox_auth;
mod raw_record;
mod storage_volume;
mod template_detail;

pub use connection_descriptor::{AuthMethod, ConnectionDescriptor};
pub use guest::{ContainerRecord, GuestKind, GuestRecord, GuestStatus, VmRecord};
pub use node::NodeRef;
pub use pool::{MemberType, PoolMember, PoolRecord};
pub use proxmox_auth::ProxmoxAuth;
pub use raw_record::RawRecord;
pub use storage_volume::{StorageBackend, StorageVolume, TemplateDescriptor};
pub use template_detail::{CpuTopology, DiskDescriptor, NetworkInterface, VmTemplateDetail};
