//! Directory principals.
//!
//! Principals are owned by the directory service; these structs are
//! snapshots filled in by the directory adapter, with the schema attributes
//! this application cares about as typed fields.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::UAC_ACCOUNTDISABLE;

/// A user account (`objectClass=user`, `objectCategory=person`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserPrincipal {
    #[schema(example = "CN=Jane Doe,OU=Staff,DC=example,DC=com")]
    pub distinguished_name: String,
    #[schema(example = "Jane Doe")]
    pub common_name: String,
    #[schema(example = "jdoe")]
    pub sam_account_name: String,
    pub user_principal_name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub user_account_control: Option<u32>,
}

impl UserPrincipal {
    /// Whether the account is enabled; unknown when UAC was not read.
    pub fn is_enabled(&self) -> Option<bool> {
        self.user_account_control
            .map(|uac| uac & UAC_ACCOUNTDISABLE == 0)
    }
}

/// A computer account, including the extended schema attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ComputerPrincipal {
    pub distinguished_name: String,
    pub common_name: String,
    pub sam_account_name: Option<String>,
    pub dns_host_name: Option<String>,
    pub user_account_control: Option<u32>,
    /// DN of the principal responsible for this machine
    pub managed_by: Option<String>,
    pub is_synchronized: Option<bool>,
    pub is_global_catalog_ready: Option<bool>,
}

/// A security or distribution group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupPrincipal {
    pub distinguished_name: String,
    pub common_name: String,
    pub sam_account_name: Option<String>,
    pub description: Option<String>,
}

/// Any principal the directory adapter can read or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    User(UserPrincipal),
    Computer(ComputerPrincipal),
    Group(GroupPrincipal),
}

impl Principal {
    pub fn distinguished_name(&self) -> &str {
        match self {
            Principal::User(u) => &u.distinguished_name,
            Principal::Computer(c) => &c.distinguished_name,
            Principal::Group(g) => &g.distinguished_name,
        }
    }

    pub fn common_name(&self) -> &str {
        match self {
            Principal::User(u) => &u.common_name,
            Principal::Computer(c) => &c.common_name,
            Principal::Group(g) => &g.common_name,
        }
    }
}

impl From<UserPrincipal> for Principal {
    fn from(user: UserPrincipal) -> Self {
        Principal::User(user)
    }
}

impl From<ComputerPrincipal> for Principal {
    fn from(computer: ComputerPrincipal) -> Self {
        Principal::Computer(computer)
    }
}

impl From<GroupPrincipal> for Principal {
    fn from(group: GroupPrincipal) -> Self {
        Principal::Group(group)
    }
}
