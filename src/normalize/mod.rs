//! Raw API payloads to typed, display-ready records.

pub mod projection;
mod record_normalizer;
mod template_detail;
pub mod units;

pub use record_normalizer::{
    normalize_guest, normalize_node, normalize_pool, normalize_storage_backend, normalize_volume,
};
pub use template_detail::parse_vm_template_detail;
