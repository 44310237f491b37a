//! Resource pools and their members.

use serde::Serialize;
use std::fmt;

/// What kind of object a pool member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    /// A VM or container (`qemu`/`lxc` in the API).
    Vm,
    Storage,
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberType::Vm => "vm",
            MemberType::Storage => "storage",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolMember {
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// VM id or storage name.
    pub id: String,
    /// Node the member lives on, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

/// A pool as returned by `/pools/{poolid}`. Members keep the API's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub members: Vec<PoolMember>,
}

impl PoolRecord {
    pub fn members_of(&self, member_type: MemberType) -> impl Iterator<Item = &PoolMember> {
        self.members
            .iter()
            .filter(move |member| member.member_type == member_type)
    }
}
