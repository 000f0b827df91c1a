//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_DIRECTORY_TIMEOUT_SECONDS, DEFAULT_MAIL_ADMIN_ADDRESS, DEFAULT_MAIL_FROM_ADDRESS,
    DEFAULT_PASSWORD_LENGTH, DEFAULT_PASSWORD_NON_ALPHANUMERIC, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_SMTP_PORT,
};
use crate::errors::{AppError, AppResult};

/// Password generation policy (`Passwords:*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub min_non_alphanumeric: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            min_non_alphanumeric: DEFAULT_PASSWORD_NON_ALPHANUMERIC,
        }
    }
}

/// Mail settings (`Mail:*`)
#[derive(Clone)]
pub struct MailSettings {
    pub from_address: String,
    pub admin_address: String,
    /// `None` means mail is logged instead of sent
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    smtp_password: Option<String>,
    pub smtp_tls: bool,
    /// Handlebars template for the notification body
    pub body_template: Option<PathBuf>,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("from_address", &self.from_address)
            .field("admin_address", &self.admin_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("smtp_tls", &self.smtp_tls)
            .field("body_template", &self.body_template)
            .finish()
    }
}

impl MailSettings {
    /// SMTP credentials, present only when both parts are configured.
    pub fn smtp_credentials(&self) -> Option<(&str, &str)> {
        match (&self.smtp_username, &self.smtp_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// Directory connection settings
#[derive(Clone)]
pub struct DirectorySettings {
    /// DNS domain name, e.g. `example.com`
    pub domain: String,
    /// LDAP URL; defaults to `ldaps://<domain>`
    pub url: String,
    pub bind_dn: Option<String>,
    bind_password: Option<String>,
    pub starttls: bool,
    pub timeout: Duration,
    /// Create accounts enabled instead of disabled
    pub enable_new_accounts: bool,
}

impl std::fmt::Debug for DirectorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySettings")
            .field("domain", &self.domain)
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"[REDACTED]")
            .field("starttls", &self.starttls)
            .field("timeout", &self.timeout)
            .field("enable_new_accounts", &self.enable_new_accounts)
            .finish()
    }
}

impl DirectorySettings {
    /// Build settings for a domain with anonymous bind.
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            url: format!("ldaps://{}", domain),
            domain,
            bind_dn: None,
            bind_password: None,
            starttls: false,
            timeout: Duration::from_secs(DEFAULT_DIRECTORY_TIMEOUT_SECONDS),
            enable_new_accounts: false,
        }
    }

    /// Attach bind credentials.
    pub fn with_credentials(
        mut self,
        bind_dn: impl Into<String>,
        bind_password: impl Into<String>,
    ) -> Self {
        self.bind_dn = Some(bind_dn.into());
        self.bind_password = Some(bind_password.into());
        self
    }

    /// Bind password, if configured.
    pub fn bind_password(&self) -> Option<&str> {
        self.bind_password.as_deref()
    }

    /// Check that the settings can be used to reach a directory.
    ///
    /// Credentials are optional, but when one half is given both must be
    /// non-empty.
    pub fn validate(&self) -> AppResult<()> {
        if self.domain.trim().is_empty() {
            return Err(AppError::invalid_argument("Directory domain name is required"));
        }

        match (self.bind_dn.as_deref(), self.bind_password.as_deref()) {
            (None, None) => Ok(()),
            (Some(dn), Some(pass)) if !dn.is_empty() && !pass.is_empty() => Ok(()),
            (dn, _) if dn.map_or(true, str::is_empty) => {
                Err(AppError::invalid_argument("Directory bind DN must not be empty"))
            }
            _ => Err(AppError::invalid_argument(
                "Directory bind password must not be empty",
            )),
        }
    }

    /// Whether the connection is encrypted, as AD requires for `unicodePwd`.
    pub fn is_encrypted(&self) -> bool {
        self.url.to_ascii_lowercase().starts_with("ldaps://") || self.starttls
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Container DN new users are created in (`Users:LdapPath`)
    pub ldap_path: String,
    pub password_policy: PasswordPolicy,
    pub mail: MailSettings,
    pub directory: DirectorySettings,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let password_policy = PasswordPolicy {
            length: parse_or(&get, "PASSWORDS_LENGTH", DEFAULT_PASSWORD_LENGTH)?,
            min_non_alphanumeric: parse_or(
                &get,
                "PASSWORDS_NON_ALPHANUMERIC",
                DEFAULT_PASSWORD_NON_ALPHANUMERIC,
            )?,
        };

        let mail = MailSettings {
            from_address: get("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_MAIL_FROM_ADDRESS.to_string()),
            admin_address: get("MAIL_ADMIN_ADDRESS")
                .unwrap_or_else(|| DEFAULT_MAIL_ADMIN_ADDRESS.to_string()),
            smtp_host: get("MAIL_SMTP_HOST"),
            smtp_port: parse_or(&get, "MAIL_SMTP_PORT", DEFAULT_SMTP_PORT)?,
            smtp_username: get("MAIL_SMTP_USERNAME"),
            smtp_password: get("MAIL_SMTP_PASSWORD"),
            smtp_tls: parse_flag(&get, "MAIL_SMTP_TLS", false)?,
            body_template: get("MAIL_BODY_TEMPLATE").map(PathBuf::from),
        };

        let domain = get("DIRECTORY_DOMAIN").unwrap_or_default();
        let directory = DirectorySettings {
            url: get("DIRECTORY_URL").unwrap_or_else(|| format!("ldaps://{}", domain)),
            domain,
            bind_dn: get("DIRECTORY_BIND_DN"),
            bind_password: get("DIRECTORY_BIND_PASSWORD"),
            starttls: parse_flag(&get, "DIRECTORY_STARTTLS", false)?,
            timeout: Duration::from_secs(parse_or(
                &get,
                "DIRECTORY_TIMEOUT_SECONDS",
                DEFAULT_DIRECTORY_TIMEOUT_SECONDS,
            )?),
            enable_new_accounts: parse_flag(&get, "DIRECTORY_ENABLE_NEW_ACCOUNTS", false)?,
        };

        Ok(Self {
            ldap_path: get("USERS_LDAP_PATH").unwrap_or_default(),
            password_policy,
            mail,
            directory,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(&get, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::invalid_argument(format!("{} must be a number, got '{}'", key, raw))
        }),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> AppResult<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::invalid_argument(format!(
                "{} must be true or false, got '{}'",
                key, v
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.password_policy, PasswordPolicy::default());
        assert_eq!(config.mail.from_address, DEFAULT_MAIL_FROM_ADDRESS);
        assert!(config.mail.smtp_host.is_none());
        assert_eq!(config.mail.smtp_port, 25);
        assert!(config.ldap_path.is_empty());
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_documented_keys_are_mapped() {
        let config = config_from(&[
            ("USERS_LDAP_PATH", "OU=Staff,DC=example,DC=com"),
            ("PASSWORDS_LENGTH", "24"),
            ("PASSWORDS_NON_ALPHANUMERIC", "5"),
            ("MAIL_FROM_ADDRESS", "ad@example.com"),
            ("MAIL_ADMIN_ADDRESS", "ops@example.com"),
            ("MAIL_SMTP_HOST", "smtp.example.com"),
        ])
        .unwrap();

        assert_eq!(config.ldap_path, "OU=Staff,DC=example,DC=com");
        assert_eq!(config.password_policy.length, 24);
        assert_eq!(config.password_policy.min_non_alphanumeric, 5);
        assert_eq!(config.mail.admin_address, "ops@example.com");
        assert_eq!(config.mail.smtp_host.as_deref(), Some("smtp.example.com"));
    }

    #[test]
    fn test_directory_url_defaults_to_ldaps_domain() {
        let config = config_from(&[("DIRECTORY_DOMAIN", "corp.example.com")]).unwrap();

        assert_eq!(config.directory.url, "ldaps://corp.example.com");
        assert!(config.directory.is_encrypted());
    }

    #[test]
    fn test_bad_number_is_invalid_argument() {
        let result = config_from(&[("PASSWORDS_LENGTH", "sixteen")]);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_bad_flag_is_invalid_argument() {
        let result = config_from(&[("DIRECTORY_STARTTLS", "maybe")]);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[
            ("DIRECTORY_DOMAIN", "example.com"),
            ("DIRECTORY_BIND_DN", "CN=svc,DC=example,DC=com"),
            ("DIRECTORY_BIND_PASSWORD", "hunter2"),
            ("MAIL_SMTP_PASSWORD", "mailpass"),
        ])
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("mailpass"));
    }

    #[test]
    fn test_directory_validation() {
        assert!(DirectorySettings::new("example.com").validate().is_ok());
        assert!(DirectorySettings::new("").validate().is_err());
        assert!(DirectorySettings::new("example.com")
            .with_credentials("CN=svc,DC=example,DC=com", "")
            .validate()
            .is_err());
        assert!(DirectorySettings::new("example.com")
            .with_credentials("", "secret")
            .validate()
            .is_err());
        assert!(DirectorySettings::new("example.com")
            .with_credentials("CN=svc,DC=example,DC=com", "secret")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_plain_ldap_without_starttls_is_unencrypted() {
        let mut settings = DirectorySettings::new("example.com");
        settings.url = "ldap://dc.example.com".to_string();
        assert!(!settings.is_encrypted());

        settings.starttls = true;
        assert!(settings.is_encrypted());
    }
}
