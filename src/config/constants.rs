//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Password Policy
// =============================================================================

/// Default generated password length
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Default minimum number of non-alphanumeric characters
pub const DEFAULT_PASSWORD_NON_ALPHANUMERIC: usize = 2;

/// Longest password the generator will produce
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Punctuation pool for the non-alphanumeric part of a password
pub const PASSWORD_PUNCTUATION: &[u8] = b"!@#$%^&*()_-+=[{]};:>|./?";

/// Letter and digit pool for the remainder of a password
pub const PASSWORD_ALPHANUMERIC: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// =============================================================================
// Directory (LDAP / Active Directory)
// =============================================================================

/// Default LDAP operation timeout in seconds
pub const DEFAULT_DIRECTORY_TIMEOUT_SECONDS: u64 = 10;

/// userAccountControl: account is disabled
pub const UAC_ACCOUNTDISABLE: u32 = 0x0002;

/// userAccountControl: default account type for a typical user
pub const UAC_NORMAL_ACCOUNT: u32 = 0x0200;

/// LDAP result code: success
pub const LDAP_RC_SUCCESS: u32 = 0;

/// LDAP result code: noSuchObject
pub const LDAP_RC_NO_SUCH_OBJECT: u32 = 32;

/// LDAP result code: invalidCredentials
pub const LDAP_RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code: entryAlreadyExists
pub const LDAP_RC_ALREADY_EXISTS: u32 = 68;

/// Object classes attached to a newly created user entry
pub const USER_OBJECT_CLASSES: &[&str] = &["top", "person", "organizationalPerson", "user"];

// =============================================================================
// Mail
// =============================================================================

/// Default sender address
pub const DEFAULT_MAIL_FROM_ADDRESS: &str = "noreply@example.com";

/// Default administrator address receiving notifications
pub const DEFAULT_MAIL_ADMIN_ADDRESS: &str = "admin@example.com";

/// Default SMTP port (plain relay)
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Subject of the account-created notification
pub const NOTIFICATION_SUBJECT: &str = "New user created in Active Directory";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Header a fronting proxy uses to pass the authenticated operator
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

// =============================================================================
// Validation
// =============================================================================

/// Longest sAMAccountName Active Directory accepts
pub const MAX_ACCOUNT_NAME_LENGTH: u64 = 20;
