//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod directory;
pub mod password;
pub mod provision;
pub mod serve;
