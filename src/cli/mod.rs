//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `password` - Generate a password
//! - `create-user` - Provision a user without the web form
//! - `lookup`, `groups`, `ping` - Directory queries

pub mod args;

pub use args::{Cli, Commands};
