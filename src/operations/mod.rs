//! Multi-step and write operations composed from session calls.

mod access;
mod container;
mod node;
mod pool;
mod storage;
pub mod task;
mod vm;

pub use access::{AccessOperations, AclEntry, TokenOptions, UserAttributes};
pub use container::{ContainerOperations, ContainerSpec};
pub use node::NodeOperations;
pub use pool::{PoolMembershipChange, PoolOperations};
pub use storage::{StorageOperations, StorageSpec};
pub use task::TaskWaiter;
pub use vm::{CloneOptions, ProvisionOutcome, VmOperations, VmSpec};
