//! Domain layer - Core entities and value objects
//!
//! Contains the password generator, the principal snapshots read from the
//! directory, and the request/outcome of a user creation. Nothing here
//! talks to the network.

pub mod distinguished_name;
pub mod notification;
pub mod password;
pub mod principal;
pub mod user;

pub use distinguished_name::{base_dn_from_domain, common_name_from_dn};
pub use notification::NotificationMessage;
pub use password::Password;
pub use principal::{ComputerPrincipal, GroupPrincipal, Principal, UserPrincipal};
pub use user::{CreateUserRequest, NotificationStatus, ProvisioningOutcome};
