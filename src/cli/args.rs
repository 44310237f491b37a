//! Command-line argument parsing with clap.

use crate::auth::application::credential_resolver::ConnectionOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line client for Proxmox VE clusters.
#[derive(Parser, Debug, Clone)]
#[command(name = "proxmox-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "PROXMOX_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cluster host (`pve.example.com`, `host:port` or a full URL).
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// User in `name@realm` form.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Password for ticket authentication.
    #[arg(
        short,
        long,
        global = true,
        env = "PROXMOX_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// API token name, used together with `--token-value`.
    #[arg(long, global = true, env = "PROXMOX_TOKEN_NAME")]
    pub token_name: Option<String>,

    /// API token secret.
    #[arg(
        long,
        global = true,
        env = "PROXMOX_TOKEN_VALUE",
        hide_env_values = true
    )]
    pub token_value: Option<String>,

    /// Verify the server's TLS certificate.
    #[arg(long, global = true, overrides_with = "no_verify_ssl")]
    pub verify_ssl: bool,

    /// Accept any TLS certificate.
    #[arg(long, global = true)]
    pub no_verify_ssl: bool,

    /// Output format; defaults to `output.format` from the configuration.
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<Format>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection flags given on the command line.
    pub fn connection_overrides(&self) -> ConnectionOverrides {
        let verify_ssl = match (self.verify_ssl, self.no_verify_ssl) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        ConnectionOverrides {
            host: self.host.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            token_name: self.token_name.clone(),
            token_value: self.token_value.clone(),
            verify_ssl,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned columns for terminals.
    Table,
    /// Pretty-printed JSON.
    Json,
    Yaml,
    /// One record per line, tab-separated.
    Plain,
}

impl Format {
    /// Parses a configured format name.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage QEMU virtual machines.
    Vm {
        #[command(subcommand)]
        command: VmCommands,
    },
    /// Manage LXC containers.
    Container {
        #[command(subcommand)]
        command: ContainerCommands,
    },
    /// Inspect VM templates.
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Inspect cluster nodes.
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },
    /// Manage storage definitions.
    Storage {
        #[command(subcommand)]
        command: StorageCommands,
    },
    /// List backup archives.
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Manage resource pools.
    Pool {
        #[command(subcommand)]
        command: PoolCommands,
    },
    /// Manage users.
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage groups.
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Manage roles.
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },
    /// Manage ACL entries.
    Acl {
        #[command(subcommand)]
        command: AclCommands,
    },
    /// Manage API tokens.
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
    /// Read and write the configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Node and storage filters shared by listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct NodeFilter {
    /// Restrict to one node.
    #[arg(short, long)]
    pub node: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GuestTarget {
    pub vmid: u32,

    /// Node hosting the guest.
    #[arg(short, long)]
    pub node: String,
}

/// Reporting of nodes skipped during cluster-wide listings.
#[derive(Args, Debug, Clone, Default)]
pub struct AggregationArgs {
    /// Fail instead of skipping unreachable nodes.
    #[arg(long, conflicts_with = "report_skipped")]
    pub strict: bool,

    /// Report unreachable nodes and storages on stderr.
    #[arg(long)]
    pub report_skipped: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum VmCommands {
    /// List VMs.
    List {
        #[command(flatten)]
        filter: NodeFilter,
        /// Only show templates.
        #[arg(long)]
        templates_only: bool,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    /// List VM templates.
    Templates {
        #[command(flatten)]
        filter: NodeFilter,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    Start(GuestTarget),
    Stop(GuestTarget),
    Status(GuestTarget),
    /// Create a VM.
    Create(VmCreateArgs),
    /// Clone a VM or template.
    Clone(VmCloneArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VmCreateArgs {
    #[arg(short, long)]
    pub node: String,
    #[arg(long)]
    pub vmid: u32,
    #[arg(long)]
    pub name: String,
    /// Memory in MB.
    #[arg(short, long, default_value_t = 2048)]
    pub memory: u32,
    #[arg(short = 'C', long, default_value_t = 2)]
    pub cores: u32,
    #[arg(short, long, default_value_t = 1)]
    pub sockets: u32,
    /// Disk size (`32G`, `512M`, `1T`).
    #[arg(short, long, default_value = "32G")]
    pub disk_size: String,
    /// Storage for the disk.
    #[arg(long, default_value = "local-lvm")]
    pub storage: String,
    /// ISO image to attach as a CD-ROM.
    #[arg(long)]
    pub iso: Option<String>,
    /// Storage holding the ISO; defaults to `--storage`.
    #[arg(long)]
    pub iso_storage: Option<String>,
    #[arg(long, default_value = "l26")]
    pub ostype: String,
    #[arg(long, default_value = "vmbr0")]
    pub network_bridge: String,
    #[arg(long, default_value = "virtio")]
    pub network_model: String,
    /// Start the VM once it has been created.
    #[arg(long)]
    pub start: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VmCloneArgs {
    /// Node hosting the source VM.
    #[arg(short, long)]
    pub node: String,
    #[arg(long)]
    pub source_vmid: u32,
    #[arg(long)]
    pub new_vmid: u32,
    #[arg(long)]
    pub name: String,
    /// Node to place the clone on.
    #[arg(long)]
    pub target_node: Option<String>,
    #[arg(long)]
    pub storage: Option<String>,
    /// Full clone instead of a linked clone.
    #[arg(long)]
    pub full: bool,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub pool: Option<String>,
    /// Start the clone once the clone task has finished.
    #[arg(long)]
    pub start: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ContainerCommands {
    /// List containers.
    List {
        #[command(flatten)]
        filter: NodeFilter,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    Start(GuestTarget),
    Stop(GuestTarget),
    Status(GuestTarget),
    /// List OS templates present on storage.
    Templates {
        #[command(flatten)]
        filter: NodeFilter,
        /// Restrict to one storage.
        #[arg(short, long)]
        storage: Option<String>,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    /// List templates offered by the appliance repositories.
    AvailableTemplates {
        #[arg(short, long)]
        node: String,
    },
    /// Download a template from the appliance repositories.
    DownloadTemplate {
        template: String,
        #[arg(short, long)]
        node: String,
        #[arg(short, long, default_value = "local")]
        storage: String,
    },
    /// Create a container from an OS template.
    Create(ContainerCreateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ContainerCreateArgs {
    pub vmid: u32,
    /// Volume id of the OS template, e.g. `local:vztmpl/debian-12.tar.zst`.
    pub ostemplate: String,
    #[arg(short, long)]
    pub node: String,
    #[arg(long)]
    pub hostname: Option<String>,
    /// Root password.
    #[arg(long)]
    pub root_password: Option<String>,
    /// Storage for the root filesystem.
    #[arg(short, long, default_value = "local-lvm")]
    pub storage: String,
    #[arg(short, long, default_value_t = 512)]
    pub memory: u32,
    #[arg(short = 'C', long, default_value_t = 1)]
    pub cores: u32,
    /// Root filesystem size in GB.
    #[arg(long, default_value_t = 8)]
    pub rootfs_size: u32,
    #[arg(long)]
    pub nameserver: Option<String>,
    #[arg(long)]
    pub searchdomain: Option<String>,
    /// Network configuration, e.g. `name=eth0,bridge=vmbr0,ip=dhcp`.
    #[arg(long)]
    pub net0: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommands {
    /// List VM templates.
    List {
        #[command(flatten)]
        filter: NodeFilter,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
    /// Show the hardware layout of a VM template.
    Info {
        vmid: u32,
        /// Node hosting the template; located automatically when omitted.
        #[arg(short, long)]
        node: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NodeCommands {
    List,
    Status { node: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StorageCommands {
    List,
    /// Create a directory-backed storage.
    Create(StorageCreateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StorageCreateArgs {
    pub storage_id: String,
    #[arg(short = 't', long = "type", default_value = "dir")]
    pub storage_type: String,
    #[arg(short = 'P', long)]
    pub path: String,
    /// Comma-separated content types (`iso,vztmpl,backup,images,rootdir,snippets`).
    #[arg(short = 'C', long)]
    pub content: Option<String>,
    /// Comma-separated node restriction.
    #[arg(short, long)]
    pub nodes: Option<String>,
    #[arg(long)]
    pub shared: bool,
    #[arg(long)]
    pub maxfiles: Option<u32>,
    /// Retention options, e.g. `keep-last=3,keep-weekly=2`.
    #[arg(long)]
    pub prune_backups: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackupCommands {
    List {
        #[command(flatten)]
        filter: NodeFilter,
        #[arg(short, long)]
        storage: Option<String>,
        #[command(flatten)]
        aggregation: AggregationArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PoolCommands {
    List,
    Show {
        poolid: String,
    },
    Create {
        poolid: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Update {
        poolid: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Delete {
        poolid: String,
    },
    /// Add VMs or storages to a pool.
    AddMember(PoolMemberArgs),
    /// Remove VMs or storages from a pool.
    RemoveMember(PoolMemberArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PoolMemberArgs {
    pub poolid: String,
    /// VM id; repeatable.
    #[arg(long = "vm")]
    pub vms: Vec<String>,
    /// Storage id; repeatable.
    #[arg(long = "storage")]
    pub storages: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UserFields {
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(long)]
    pub firstname: Option<String>,
    #[arg(long)]
    pub lastname: Option<String>,
    /// Comma-separated group list.
    #[arg(long)]
    pub groups: Option<String>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
    /// Expiry as a Unix epoch.
    #[arg(long)]
    pub expire: Option<u64>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    List,
    Show {
        userid: String,
    },
    Create {
        userid: String,
        /// Initial password.
        #[arg(long)]
        user_password: Option<String>,
        #[command(flatten)]
        fields: UserFields,
    },
    Update {
        userid: String,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        userid: String,
    },
    SetPassword {
        userid: String,
        #[arg(long)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommands {
    List,
    Show {
        groupid: String,
    },
    Create {
        groupid: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Update {
        groupid: String,
        #[arg(long)]
        comment: Option<String>,
    },
    Delete {
        groupid: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum RoleCommands {
    List,
    Show {
        roleid: String,
    },
    Create {
        roleid: String,
        /// Comma-separated privilege list.
        #[arg(long)]
        privs: Option<String>,
    },
    Update {
        roleid: String,
        #[arg(long)]
        privs: String,
        /// Add to the existing privileges instead of replacing them.
        #[arg(long)]
        append: bool,
    },
    Delete {
        roleid: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AclArgs {
    /// ACL path, e.g. `/` or `/vms/100`.
    #[arg(long)]
    pub path: String,
    #[arg(short, long)]
    pub roles: String,
    #[arg(long)]
    pub users: Option<String>,
    #[arg(short, long)]
    pub groups: Option<String>,
    #[arg(short, long)]
    pub tokens: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AclCommands {
    List,
    /// Grant roles on a path.
    Add {
        #[command(flatten)]
        entry: AclArgs,
        /// Do not propagate to child paths.
        #[arg(long)]
        no_propagate: bool,
    },
    /// Revoke roles on a path.
    Remove {
        #[command(flatten)]
        entry: AclArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TokenFields {
    #[arg(long, conflicts_with = "no_privsep")]
    pub privsep: bool,
    #[arg(long)]
    pub no_privsep: bool,
    #[arg(long)]
    pub expire: Option<u64>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TokenCommands {
    List {
        userid: String,
    },
    Show {
        userid: String,
        tokenid: String,
    },
    /// Create a token. The secret is printed once.
    Create {
        userid: String,
        tokenid: String,
        #[command(flatten)]
        fields: TokenFields,
    },
    Update {
        userid: String,
        tokenid: String,
        #[command(flatten)]
        fields: TokenFields,
    },
    Delete {
        userid: String,
        tokenid: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the whole configuration.
    Show,
    /// Print one dotted path, e.g. `proxmox.host`.
    Get { path: String },
    /// Set one dotted path and save the file.
    Set { path: String, value: String },
    /// Print the configuration file location.
    Path,
}
