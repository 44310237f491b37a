//! Client library and command-line front end for Proxmox VE clusters.
//!
//! The crate is layered:
//!
//! - [`ConfigStore`] and [`CredentialResolver`] turn the configuration file
//!   and command-line flags into a [`ConnectionDescriptor`]
//! - [`ClusterSession`] owns one authenticated connection
//! - [`ClusterAggregator`] fans reads out over every node
//! - [`normalize`] turns raw API records into typed ones
//! - [`operations`] composes multi-step writes such as clone-then-start
//!
//! # Examples
//!
//! ```no_run
//! use proxmox_cli::{
//!     ClusterAggregator, ClusterSession, ConfigStore, ConnectionOverrides, CredentialResolver,
//!     ProxmoxResult,
//! };
//!
//! #[tokio::main]
//! async fn main() -> ProxmoxResult<()> {
//!     let config = ConfigStore::new(None).load();
//!     let descriptor = CredentialResolver::new(ConnectionOverrides::default(), &config)
//!         .resolve(&ConnectionOverrides::default())?;
//!     let session = ClusterSession::connect(&descriptor).await?;
//!
//!     let vms = ClusterAggregator::new(&session).list_vms(None).await?;
//!     for vm in vms.items {
//!         println!("{} {} on {}", vm.vmid, vm.name, vm.node);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregation;
mod auth;
pub mod cli;
mod core;
pub mod normalize;
pub mod operations;
pub mod session;

pub use crate::aggregation::{
    Aggregated, AggregationPolicy, ClusterAggregator, NodeFailure, SkippedSource,
};
pub use crate::auth::application::credential_resolver::{ConnectionOverrides, CredentialResolver};
pub use crate::core::{
    domain::{
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        model::{
            AuthMethod, ConnectionDescriptor, ContainerRecord, CpuTopology, DiskDescriptor,
            GuestKind, GuestRecord, GuestStatus, MemberType, NetworkInterface, NodeRef,
            PoolMember, PoolRecord, RawRecord, StorageBackend, StorageVolume, TemplateDescriptor,
            VmRecord, VmTemplateDetail,
        },
        value_object::{
            IdentifierList, ProxmoxUrl, ProxmoxUsername, ResourcePath, Secret, VolumeSpec,
        },
    },
    infrastructure::{
        api_client::{ApiMethod, ApiTransport},
        config_store::{ConfigStore, ConfigTree},
    },
};
pub use crate::session::{ClusterSession, Resource};

#[cfg(test)]
mod tests;
