//! Service Container - Centralized service access.
//!
//! Wires the directory adapter, mail transport and provisioning flow from
//! configuration, and hands them out behind their traits.

use std::sync::Arc;

use super::{
    body_renderer, EmailNotifier, Notifier, Provisioner, ProvisioningSettings, UserProvisioning,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{mail_transport, DirectoryAccess, LdapDirectory};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get the provisioning flow
    fn provisioning(&self) -> Arc<dyn UserProvisioning>;

    /// Get directory access
    fn directory(&self) -> Arc<dyn DirectoryAccess>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    provisioning: Arc<dyn UserProvisioning>,
    directory: Arc<dyn DirectoryAccess>,
}

impl Services {
    /// Create a service container from already-built services
    pub fn new(
        provisioning: Arc<dyn UserProvisioning>,
        directory: Arc<dyn DirectoryAccess>,
    ) -> Self {
        Self {
            provisioning,
            directory,
        }
    }

    /// Build every service from configuration.
    ///
    /// Fails on invalid directory settings or an unreadable body template;
    /// nothing is contacted over the network.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let directory: Arc<dyn DirectoryAccess> =
            Arc::new(LdapDirectory::new(config.directory.clone())?);
        let notifier: Arc<dyn Notifier> =
            Arc::new(EmailNotifier::new(mail_transport(&config.mail)));
        let body = body_renderer(&config.mail)?;

        let provisioning = Arc::new(Provisioner::new(
            directory.clone(),
            notifier,
            body,
            ProvisioningSettings::from_config(config),
        ));

        Ok(Self::new(provisioning, directory))
    }
}

impl ServiceContainer for Services {
    fn provisioning(&self) -> Arc<dyn UserProvisioning> {
        self.provisioning.clone()
    }

    fn directory(&self) -> Arc<dyn DirectoryAccess> {
        self.directory.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn config(pairs: &'static [(&'static str, &'static str)]) -> AppResult<Config> {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_from_config_wires_services() {
        let config = config(&[("DIRECTORY_DOMAIN", "example.com")]).unwrap();
        assert!(Services::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_requires_domain() {
        let config = config(&[]).unwrap();
        assert!(matches!(
            Services::from_config(&config),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_missing_template() {
        let config = config(&[
            ("DIRECTORY_DOMAIN", "example.com"),
            ("MAIL_BODY_TEMPLATE", "/nonexistent/body.hbs"),
        ])
        .unwrap();
        assert!(matches!(
            Services::from_config(&config),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
