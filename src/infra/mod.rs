//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Active Directory over LDAP
//! - Mail delivery over SMTP

pub mod directory;
pub mod mail;

pub use directory::{DirectoryAccess, LdapDirectory};
pub use mail::{mail_transport, LogMailer, MailTransport, SmtpMailer};

#[cfg(any(test, feature = "test-utils"))]
pub use mail::MockMailTransport;
