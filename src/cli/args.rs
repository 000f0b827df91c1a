//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

/// AD User Provisioner - Create Active Directory users and notify administrators
#[derive(Parser, Debug)]
#[command(name = "ad-provisioner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Env file loaded before the process environment is read
    #[arg(short, long, global = true, env = "CONFIG_PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Generate a password with the configured or given policy
    Password(PasswordArgs),

    /// Create a directory user and notify administrators
    CreateUser(CreateUserArgs),

    /// Look up a principal in the directory
    Lookup(LookupArgs),

    /// List the groups a user is a member of
    Groups(GroupsArgs),

    /// Check that the directory accepts a bind
    Ping,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (defaults to SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (defaults to SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the password command
#[derive(Parser, Debug)]
pub struct PasswordArgs {
    /// Password length (defaults to PASSWORDS_LENGTH)
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Minimum non-alphanumeric characters (defaults to PASSWORDS_NON_ALPHANUMERIC)
    #[arg(short = 'n', long)]
    pub min_non_alphanumeric: Option<usize>,
}

/// Arguments for the create-user command
#[derive(Parser, Debug)]
pub struct CreateUserArgs {
    /// Pre-Windows 2000 logon name (sAMAccountName)
    pub account_name: String,

    /// Display name; also used as the entry's common name
    #[arg(short, long, default_value = "")]
    pub display_name: String,

    /// Email address
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Operator recorded in logs and the notification
    #[arg(long, env = "USER")]
    pub created_by: Option<String>,
}

/// Principal kinds that can be looked up
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    /// User by common name
    UserCn,
    /// User by distinguished name
    UserDn,
    /// User by sAMAccountName
    UserSam,
    /// Computer by name
    Computer,
    /// Group by common name or sAMAccountName
    Group,
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// What to look up
    #[arg(value_enum)]
    pub kind: LookupKind,

    /// Name or DN of the principal
    pub identity: String,

    /// Container DN to search in (defaults to the domain root)
    #[arg(long)]
    pub path: Option<String>,
}

/// Arguments for the groups command
#[derive(Parser, Debug)]
pub struct GroupsArgs {
    /// sAMAccountName of the user
    pub account_name: String,

    /// Container DN to find the user in (defaults to the domain root)
    #[arg(long)]
    pub path: Option<String>,
}
