//! Application state - Dependency injection container.
//!
//! Provides handlers with the provisioning flow and directory access.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::DirectoryAccess;
use crate::services::{ServiceContainer, Services, UserProvisioning};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// User provisioning flow
    pub provisioning: Arc<dyn UserProvisioning>,
    /// Directory access, used by the health check
    pub directory: Arc<dyn DirectoryAccess>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let container = Services::from_config(config)?;
        Ok(Self::from_container(&container))
    }

    /// Create application state from a service container.
    pub fn from_container(container: &dyn ServiceContainer) -> Self {
        Self {
            provisioning: container.provisioning(),
            directory: container.directory(),
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        provisioning: Arc<dyn UserProvisioning>,
        directory: Arc<dyn DirectoryAccess>,
    ) -> Self {
        Self {
            provisioning,
            directory,
        }
    }
}
