//! Directory access - Active Directory over LDAP.
//!
//! Services depend on the [`DirectoryAccess`] trait; [`LdapDirectory`] is
//! the production adapter. Every call opens its own connection and unbinds
//! before returning.

pub mod filter;
mod ldap;
pub mod mapping;
#[cfg(test)]
mod test_server;

use async_trait::async_trait;

use crate::domain::{
    common_name_from_dn, ComputerPrincipal, GroupPrincipal, Password, Principal, UserPrincipal,
};
use crate::errors::AppResult;

pub use ldap::LdapDirectory;

/// Directory operations used by provisioning and lookups.
///
/// `path` is an optional container DN below the domain root; `None`
/// searches the whole domain.
#[async_trait]
pub trait DirectoryAccess: Send + Sync {
    /// Bind to the domain root and release the connection.
    async fn ping(&self) -> AppResult<()>;

    async fn find_user_by_common_name(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<UserPrincipal>>;

    /// Look up a user by DN via the common name it carries.
    async fn find_user_by_distinguished_name(
        &self,
        distinguished_name: &str,
    ) -> AppResult<Option<UserPrincipal>> {
        let common_name = common_name_from_dn(distinguished_name)?;
        self.find_user_by_common_name(&common_name, None).await
    }

    async fn find_user_by_sam_account_name(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<UserPrincipal>>;

    async fn find_computer(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<ComputerPrincipal>>;

    async fn find_group(&self, name: &str, path: Option<&str>)
        -> AppResult<Option<GroupPrincipal>>;

    /// Groups that list the principal as a direct member.
    async fn list_groups(&self, principal: &Principal) -> AppResult<Vec<GroupPrincipal>>;

    /// Create a user under `path` and return its DN.
    async fn create_user(
        &self,
        account_name: &str,
        email_address: &str,
        password: &Password,
        display_name: &str,
        path: &str,
    ) -> AppResult<String>;

    /// Write back the populated writable fields of a principal.
    async fn update(&self, principal: &Principal) -> AppResult<()>;
}
