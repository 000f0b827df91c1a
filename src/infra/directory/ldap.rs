//! LDAP adapter for [`DirectoryAccess`](super::DirectoryAccess).

use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry, SearchResult};
use tracing::{debug, info, instrument, warn};

use super::filter;
use super::mapping::{self, AddAttributes, EntryAttributes, NewUser};
use super::DirectoryAccess;
use crate::config::{
    DirectorySettings, LDAP_RC_ALREADY_EXISTS, LDAP_RC_INVALID_CREDENTIALS,
    LDAP_RC_NO_SUCH_OBJECT, LDAP_RC_SUCCESS,
};
use crate::domain::{
    base_dn_from_domain, ComputerPrincipal, GroupPrincipal, Password, Principal, UserPrincipal,
};
use crate::errors::{AppError, AppResult};

/// Active Directory reached over LDAP.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    settings: DirectorySettings,
    base_dn: String,
}

impl LdapDirectory {
    /// Validate settings and derive the domain root.
    pub fn new(settings: DirectorySettings) -> AppResult<Self> {
        settings.validate()?;
        let base_dn = base_dn_from_domain(&settings.domain)?;
        Ok(Self { settings, base_dn })
    }

    /// Domain root, e.g. `DC=example,DC=com`
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    fn search_base<'a>(&'a self, path: Option<&'a str>) -> &'a str {
        match path.map(str::trim) {
            Some(path) if !path.is_empty() => path,
            _ => &self.base_dn,
        }
    }

    async fn groups_of(
        &self,
        session: &mut DirectorySession,
        dn: &str,
    ) -> AppResult<Vec<GroupPrincipal>> {
        let mut groups: Vec<GroupPrincipal> = session
            .search(
                &self.base_dn,
                &filter::groups_with_member(dn),
                mapping::GROUP_ATTRIBUTES,
            )
            .await?
            .iter()
            .map(mapping::to_group)
            .collect();

        if let Some(primary) = self.primary_group(session, dn).await? {
            let listed = groups.iter().any(|group| {
                group
                    .distinguished_name
                    .eq_ignore_ascii_case(&primary.distinguished_name)
            });
            if !listed {
                groups.insert(0, primary);
            }
        }

        Ok(groups)
    }

    /// Resolve `primaryGroupID` against the domain part of the entry's SID.
    async fn primary_group(
        &self,
        session: &mut DirectorySession,
        dn: &str,
    ) -> AppResult<Option<GroupPrincipal>> {
        let sid = match session.read(dn, mapping::PRIMARY_GROUP_ATTRIBUTES).await? {
            Some(entry) => mapping::primary_group_sid(&entry),
            None => None,
        };
        let Some(sid) = sid else {
            debug!("No primary group on entry");
            return Ok(None);
        };

        let found = session
            .search(
                &self.base_dn,
                &filter::group_by_sid(&sid),
                mapping::GROUP_ATTRIBUTES,
            )
            .await?;
        Ok(found.first().map(mapping::to_group))
    }

    async fn connect(&self) -> AppResult<DirectorySession> {
        DirectorySession::open(&self.settings).await
    }

    async fn find_one(
        &self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> AppResult<Option<EntryAttributes>> {
        let mut session = self.connect().await?;
        let result = session.search(base, filter, attrs).await;
        session.close().await;

        let mut entries = result?;
        if entries.len() > 1 {
            warn!(filter, matches = entries.len(), "Ambiguous directory lookup, using first match");
        }
        Ok(if entries.is_empty() {
            None
        } else {
            Some(entries.swap_remove(0))
        })
    }
}

#[async_trait]
impl DirectoryAccess for LdapDirectory {
    #[instrument(skip(self), fields(url = %self.settings.url))]
    async fn ping(&self) -> AppResult<()> {
        let session = self.connect().await?;
        session.close().await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user_by_common_name(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<UserPrincipal>> {
        let entry = self
            .find_one(
                self.search_base(path),
                &filter::user_by_common_name(name),
                mapping::USER_ATTRIBUTES,
            )
            .await?;
        Ok(entry.as_ref().map(mapping::to_user))
    }

    #[instrument(skip(self))]
    async fn find_user_by_sam_account_name(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<UserPrincipal>> {
        let entry = self
            .find_one(
                self.search_base(path),
                &filter::user_by_sam_account_name(name),
                mapping::USER_ATTRIBUTES,
            )
            .await?;
        Ok(entry.as_ref().map(mapping::to_user))
    }

    #[instrument(skip(self))]
    async fn find_computer(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<ComputerPrincipal>> {
        let entry = self
            .find_one(
                self.search_base(path),
                &filter::computer_by_name(name),
                mapping::COMPUTER_ATTRIBUTES,
            )
            .await?;
        Ok(entry.as_ref().map(mapping::to_computer))
    }

    #[instrument(skip(self))]
    async fn find_group(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> AppResult<Option<GroupPrincipal>> {
        let entry = self
            .find_one(
                self.search_base(path),
                &filter::group_by_name(name),
                mapping::GROUP_ATTRIBUTES,
            )
            .await?;
        Ok(entry.as_ref().map(mapping::to_group))
    }

    /// Direct memberships plus the primary group, which AD never lists in
    /// the group's `member` attribute.
    #[instrument(skip(self, principal), fields(dn = %principal.distinguished_name()))]
    async fn list_groups(&self, principal: &Principal) -> AppResult<Vec<GroupPrincipal>> {
        let dn = principal.distinguished_name();
        if dn.is_empty() {
            return Err(AppError::invalid_argument("Principal has no distinguished name"));
        }

        let mut session = self.connect().await?;
        let result = self.groups_of(&mut session, dn).await;
        session.close().await;
        result
    }

    #[instrument(skip(self, password, email_address, display_name))]
    async fn create_user(
        &self,
        account_name: &str,
        email_address: &str,
        password: &Password,
        display_name: &str,
        path: &str,
    ) -> AppResult<String> {
        let account_name = account_name.trim();
        let path = path.trim();

        if account_name.is_empty() {
            return Err(AppError::invalid_argument("Account name is required"));
        }
        if path.is_empty() {
            return Err(AppError::invalid_argument("Container path is required"));
        }
        if !self.settings.is_encrypted() {
            return Err(AppError::invalid_argument(
                "Creating users requires an ldaps:// URL or StartTLS",
            ));
        }

        let display_name = display_name.trim();
        let common_name = if display_name.is_empty() {
            account_name
        } else {
            display_name
        };
        let dn = format!("CN={},{}", filter::escape_dn_value(common_name), path);

        let user = NewUser {
            account_name,
            common_name,
            display_name,
            email_address: email_address.trim(),
            enabled: self.settings.enable_new_accounts,
        };
        let attrs = mapping::new_user_attributes(&user, password.expose());

        let mut session = self.connect().await?;
        let result = session.add(&dn, attrs).await;
        session.close().await;
        result?;

        info!(dn = %dn, enabled = user.enabled, "User created in directory");
        Ok(dn)
    }

    #[instrument(skip(self, principal), fields(dn = %principal.distinguished_name()))]
    async fn update(&self, principal: &Principal) -> AppResult<()> {
        let dn = principal.distinguished_name();
        if dn.is_empty() {
            return Err(AppError::invalid_argument("Principal has no distinguished name"));
        }

        let mods = mapping::modifications(principal);
        if mods.is_empty() {
            debug!("No populated attributes to update");
            return Ok(());
        }

        let mut session = self.connect().await?;
        let result = session.modify(dn, mods).await;
        session.close().await;
        result
    }
}

/// One bound connection, used for a single directory call.
struct DirectorySession {
    ldap: Ldap,
    timeout: Duration,
}

impl DirectorySession {
    async fn open(settings: &DirectorySettings) -> AppResult<Self> {
        debug!(url = %settings.url, starttls = settings.starttls, "Connecting to directory");

        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(settings.timeout)
            .set_starttls(settings.starttls);

        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &settings.url)
            .await
            .map_err(|e| {
                AppError::directory_connection(
                    format!("Failed to connect to {}", settings.url),
                    e,
                )
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let mut session = Self {
            ldap,
            timeout: settings.timeout,
        };

        let bind_dn = settings.bind_dn.as_deref().unwrap_or("");
        let bind_password = settings.bind_password().unwrap_or("");
        if let Err(e) = session.bind(bind_dn, bind_password).await {
            session.close().await;
            return Err(e);
        }

        Ok(session)
    }

    async fn bind(&mut self, bind_dn: &str, bind_password: &str) -> AppResult<()> {
        let who = if bind_dn.is_empty() { "anonymous" } else { bind_dn };

        let result = self
            .ldap
            .with_timeout(self.timeout)
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| AppError::directory_connection(format!("Bind failed for {}", who), e))?;

        match result.rc {
            LDAP_RC_SUCCESS => Ok(()),
            LDAP_RC_INVALID_CREDENTIALS => Err(AppError::directory_connection(
                format!("Invalid credentials for {}", who),
                result.text,
            )),
            rc => Err(AppError::directory_connection(
                format!("Bind failed for {} with code {}", who, rc),
                result.text,
            )),
        }
    }

    /// Subtree search. A missing base yields no entries.
    async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> AppResult<Vec<EntryAttributes>> {
        self.search_scoped(base, Scope::Subtree, filter, attrs).await
    }

    /// Read a single entry by DN.
    async fn read(&mut self, dn: &str, attrs: &[&str]) -> AppResult<Option<EntryAttributes>> {
        let mut entries = self
            .search_scoped(dn, Scope::Base, "(objectClass=*)", attrs)
            .await?;
        Ok(if entries.is_empty() {
            None
        } else {
            Some(entries.swap_remove(0))
        })
    }

    async fn search_scoped(
        &mut self,
        base: &str,
        scope: Scope,
        filter: &str,
        attrs: &[&str],
    ) -> AppResult<Vec<EntryAttributes>> {
        debug!(base, filter, "Searching directory");

        let SearchResult(entries, result) = self
            .ldap
            .with_timeout(self.timeout)
            .search(base, scope, filter, attrs)
            .await
            .map_err(|e| {
                AppError::directory_connection(format!("Search under {} failed", base), e)
            })?;

        match result.rc {
            LDAP_RC_SUCCESS => {}
            LDAP_RC_NO_SUCH_OBJECT => return Ok(Vec::new()),
            rc => {
                return Err(AppError::directory_operation(format!(
                    "Search under {} failed with code {}: {}",
                    base, rc, result.text
                )))
            }
        }

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.is_ref())
            .map(|entry| EntryAttributes::from(SearchEntry::construct(entry)))
            .collect())
    }

    async fn add(&mut self, dn: &str, attrs: AddAttributes) -> AppResult<()> {
        let result = self
            .ldap
            .with_timeout(self.timeout)
            .add(dn, attrs)
            .await
            .map_err(|e| {
                AppError::directory_connection(format!("Failed to create {}", dn), e)
            })?;

        match result.rc {
            LDAP_RC_SUCCESS => Ok(()),
            LDAP_RC_ALREADY_EXISTS => Err(AppError::directory_operation(format!(
                "Entry already exists: {}",
                dn
            ))),
            rc => Err(AppError::directory_operation(format!(
                "Add of {} failed with code {}: {}",
                dn, rc, result.text
            ))),
        }
    }

    async fn modify(&mut self, dn: &str, mods: Vec<Mod<Vec<u8>>>) -> AppResult<()> {
        let result = self
            .ldap
            .with_timeout(self.timeout)
            .modify(dn, mods)
            .await
            .map_err(|e| {
                AppError::directory_connection(format!("Failed to update {}", dn), e)
            })?;

        match result.rc {
            LDAP_RC_SUCCESS => Ok(()),
            LDAP_RC_NO_SUCH_OBJECT => Err(AppError::NotFound),
            rc => Err(AppError::directory_operation(format!(
                "Modify of {} failed with code {}: {}",
                dn, rc, result.text
            ))),
        }
    }

    /// Unbind; failures are only logged.
    async fn close(mut self) {
        if let Err(e) = self.ldap.unbind().await {
            warn!(error = %e, "Error during LDAP unbind");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::directory::test_server::{
        self, bind_then, search_done, search_entry, Reply, Request,
    };
    use tokio_test::{assert_err, assert_ok};

    fn directory(url: &str, starttls: bool) -> LdapDirectory {
        let mut settings = DirectorySettings::new("example.com");
        settings.url = url.to_string();
        settings.starttls = starttls;
        LdapDirectory::new(settings).unwrap()
    }

    #[test]
    fn test_base_dn_derived_from_domain() {
        let dir = directory("ldaps://dc01.example.com", false);
        assert_eq!(dir.base_dn(), "DC=example,DC=com");
    }

    #[test]
    fn test_new_rejects_half_credentials() {
        let settings = DirectorySettings::new("example.com").with_credentials("", "secret");
        assert!(matches!(
            LdapDirectory::new(settings),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_search_base_defaults_to_root() {
        let dir = directory("ldaps://dc01.example.com", false);
        assert_eq!(dir.search_base(None), "DC=example,DC=com");
        assert_eq!(dir.search_base(Some("  ")), "DC=example,DC=com");
        assert_eq!(
            dir.search_base(Some("OU=Staff,DC=example,DC=com")),
            "OU=Staff,DC=example,DC=com"
        );
    }

    #[tokio::test]
    async fn test_create_user_empty_account_name_fails_before_connecting() {
        // Unroutable URL: reaching the network would surface a connection error instead
        let dir = directory("ldaps://192.0.2.1:636", false);
        let password = Password::generate(16, 2).unwrap();

        let result = dir
            .create_user(
                "  ",
                "jane@example.com",
                &password,
                "Jane Doe",
                "OU=Staff,DC=example,DC=com",
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_create_user_empty_path_fails_before_connecting() {
        let dir = directory("ldaps://192.0.2.1:636", false);
        let password = Password::generate(16, 2).unwrap();

        let result = dir
            .create_user("jdoe", "jane@example.com", &password, "Jane Doe", "")
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_create_user_requires_encryption() {
        let dir = directory("ldap://192.0.2.1:389", false);
        let password = Password::generate(16, 2).unwrap();

        let result = dir
            .create_user(
                "jdoe",
                "jane@example.com",
                &password,
                "Jane Doe",
                "OU=Staff,DC=example,DC=com",
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_find_by_dn_without_ou_fails_before_connecting() {
        let dir = directory("ldaps://192.0.2.1:636", false);
        let result = dir
            .find_user_by_distinguished_name("CN=Jane Doe,DC=example,DC=com")
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    /// S-1-5-21-200-2-3-<rid>
    fn sid(rid: u32) -> Vec<u8> {
        let mut sid = vec![1, 5, 0, 0, 0, 0, 0, 5];
        for sub_authority in [21u32, 200, 2, 3, rid] {
            sid.extend_from_slice(&sub_authority.to_le_bytes());
        }
        sid
    }

    #[tokio::test]
    async fn test_ping_refused_connection_is_connection_error() {
        let dir = directory(&test_server::closed_port_url().await, false);

        let err = assert_err!(dir.ping().await);
        assert!(matches!(err, AppError::DirectoryConnection { .. }));
    }

    #[tokio::test]
    async fn test_ping_binds_anonymously() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || Reply::Hangup)
        }
        let dir = directory(&test_server::spawn(script).await, false);

        assert_ok!(dir.ping().await);
    }

    #[tokio::test]
    async fn test_invalid_credentials_is_connection_error() {
        fn script(_: &Request<'_>) -> Reply {
            Reply::Send(vec![test_server::bind_response(
                test_server::RC_INVALID_CREDENTIALS,
            )])
        }
        let mut settings = DirectorySettings::new("example.com")
            .with_credentials("CN=svc-provision,OU=Services,DC=example,DC=com", "wrong");
        settings.url = test_server::spawn(script).await;
        let dir = LdapDirectory::new(settings).unwrap();

        let err = assert_err!(dir.ping().await);
        assert!(matches!(err, AppError::DirectoryConnection { .. }));
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_connection_dropped_during_search_is_connection_error() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || Reply::Hangup)
        }
        let dir = directory(&test_server::spawn(script).await, false);

        let err = assert_err!(dir.find_user_by_sam_account_name("jdoe", None).await);
        assert!(matches!(err, AppError::DirectoryConnection { .. }));
    }

    #[tokio::test]
    async fn test_rejected_search_is_operation_error() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || {
                Reply::Send(vec![search_done(test_server::RC_INSUFFICIENT_ACCESS)])
            })
        }
        let dir = directory(&test_server::spawn(script).await, false);

        let err = assert_err!(dir.find_group("Sales", None).await);
        assert!(matches!(err, AppError::DirectoryOperation(_)));
    }

    #[tokio::test]
    async fn test_missing_search_base_finds_nothing() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || {
                Reply::Send(vec![search_done(test_server::RC_NO_SUCH_OBJECT)])
            })
        }
        let dir = directory(&test_server::spawn(script).await, false);

        let found = assert_ok!(
            dir.find_user_by_common_name("Jane Doe", Some("OU=Gone,DC=example,DC=com"))
                .await
        );
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_user_maps_entry() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || {
                Reply::Send(vec![
                    search_entry(
                        "CN=Jane Doe,OU=Staff,DC=example,DC=com",
                        &[
                            ("cn", b"Jane Doe"),
                            ("sAMAccountName", b"jdoe"),
                            ("userAccountControl", b"512"),
                        ],
                    ),
                    search_done(test_server::RC_SUCCESS),
                ])
            })
        }
        let dir = directory(&test_server::spawn(script).await, false);

        let user = assert_ok!(dir.find_user_by_sam_account_name("jdoe", None).await).unwrap();
        assert_eq!(user.distinguished_name, "CN=Jane Doe,OU=Staff,DC=example,DC=com");
        assert_eq!(user.is_enabled(), Some(true));
    }

    #[tokio::test]
    async fn test_list_groups_includes_primary_group() {
        fn script(request: &Request<'_>) -> Reply {
            bind_then(request.op, || {
                let ops = match request.searches_seen {
                    // groups listing the user in `member`
                    0 => vec![search_entry(
                        "CN=Sales,OU=Groups,DC=example,DC=com",
                        &[("cn", b"Sales")],
                    )],
                    // the user entry itself
                    1 => vec![search_entry(
                        "CN=Jane Doe,OU=Staff,DC=example,DC=com",
                        &[("primaryGroupID", b"513"), ("objectSid", &sid(1105))],
                    )],
                    // group lookup by the derived SID
                    _ if test_server::contains(request.raw, &sid(513)) => {
                        vec![search_entry(
                            "CN=Domain Users,CN=Users,DC=example,DC=com",
                            &[("cn", b"Domain Users"), ("sAMAccountName", b"Domain Users")],
                        )]
                    }
                    _ => vec![],
                };
                Reply::Send([ops, vec![search_done(test_server::RC_SUCCESS)]].concat())
            })
        }
        let dir = directory(&test_server::spawn(script).await, false);
        let user = Principal::User(UserPrincipal {
            distinguished_name: "CN=Jane Doe,OU=Staff,DC=example,DC=com".into(),
            common_name: "Jane Doe".into(),
            sam_account_name: "jdoe".into(),
            ..Default::default()
        });

        let groups = assert_ok!(dir.list_groups(&user).await);
        let names: Vec<&str> = groups.iter().map(|g| g.common_name.as_str()).collect();
        assert_eq!(names, ["Domain Users", "Sales"]);
    }
}
