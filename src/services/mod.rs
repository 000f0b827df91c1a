//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

pub mod container;
pub mod notification_body;
mod notifier;
mod provisioning;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use notification_body::{body_renderer, AccountCreated, BodyRenderer, EmptyBody, TemplateBody};
pub use notifier::{EmailNotifier, Notifier};
pub use provisioning::{Provisioner, ProvisioningSettings, UserProvisioning};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_body::MockBodyRenderer;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use provisioning::MockUserProvisioning;
