//! AD User Provisioner - Create Active Directory users from a web form
//!
//! An operator submits an account name, display name and email address.
//! The service generates a password, creates the user over LDAP and mails
//! the administrators.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Passwords, principals, requests and outcomes
//! - **services**: Provisioning flow and notifications
//! - **infra**: LDAP directory and SMTP mail adapters
//! - **api**: HTTP handlers, views and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Provision a user without the form
//! cargo run -- create-user jdoe --display-name "Jane Doe" --email jane@example.com
//!
//! # Look up a user
//! cargo run -- lookup user-sam jdoe
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Principal};
pub use errors::{AppError, AppResult};
pub use infra::{DirectoryAccess, LdapDirectory};
