//! Provisioning service - creates a directory user and notifies administrators.
//!
//! The flow is linear: validate, generate a password, create the account,
//! then notify. A failed notification does not undo the account; it is
//! reported on the outcome instead.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::notification_body::{AccountCreated, BodyRenderer};
use super::Notifier;
use crate::config::{Config, PasswordPolicy, NOTIFICATION_SUBJECT};
use crate::domain::{
    CreateUserRequest, NotificationMessage, NotificationStatus, Password, ProvisioningOutcome,
};
use crate::errors::{AppError, AppResult};
use crate::infra::DirectoryAccess;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Policy values the provisioning flow runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSettings {
    /// Container DN new users are created in
    pub ldap_path: String,
    pub password_policy: PasswordPolicy,
    pub from_address: String,
    pub admin_address: String,
}

impl ProvisioningSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ldap_path: config.ldap_path.clone(),
            password_policy: config.password_policy,
            from_address: config.mail.from_address.clone(),
            admin_address: config.mail.admin_address.clone(),
        }
    }
}

/// User provisioning trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserProvisioning: Send + Sync {
    /// Create the account described by `request` and notify administrators.
    async fn create_user(&self, request: CreateUserRequest) -> AppResult<ProvisioningOutcome>;
}

/// Concrete implementation of UserProvisioning.
pub struct Provisioner {
    directory: Arc<dyn DirectoryAccess>,
    notifier: Arc<dyn Notifier>,
    body: Arc<dyn BodyRenderer>,
    settings: ProvisioningSettings,
}

impl Provisioner {
    pub fn new(
        directory: Arc<dyn DirectoryAccess>,
        notifier: Arc<dyn Notifier>,
        body: Arc<dyn BodyRenderer>,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            directory,
            notifier,
            body,
            settings,
        }
    }

    pub fn settings(&self) -> &ProvisioningSettings {
        &self.settings
    }

    async fn notify_administrators(
        &self,
        request: &CreateUserRequest,
        distinguished_name: &str,
    ) -> AppResult<()> {
        let account = AccountCreated {
            account_name: request.account_name.clone(),
            display_name: request.display_name.clone(),
            email_address: request.email_address.clone(),
            created_by: request
                .created_by
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            distinguished_name: distinguished_name.to_string(),
        };
        let body = self.body.render(&account)?;

        let message = NotificationMessage::new(
            NOTIFICATION_SUBJECT,
            body,
            &self.settings.from_address,
            &self.settings.admin_address,
        );
        self.notifier.send(&message).await
    }
}

#[async_trait]
impl UserProvisioning for Provisioner {
    #[instrument(skip_all, fields(account = %request.account_name.trim()))]
    async fn create_user(&self, request: CreateUserRequest) -> AppResult<ProvisioningOutcome> {
        let request = request.normalized();
        request.ensure_valid()?;

        if self.settings.ldap_path.trim().is_empty() {
            return Err(AppError::invalid_argument(
                "USERS_LDAP_PATH is not configured",
            ));
        }

        let request_id = Uuid::new_v4();
        let password = Password::from_policy(&self.settings.password_policy)?;

        let distinguished_name = self
            .directory
            .create_user(
                &request.account_name,
                &request.email_address,
                &password,
                &request.display_name,
                &self.settings.ldap_path,
            )
            .await?;

        info!(
            request_id = %request_id,
            dn = %distinguished_name,
            created_by = request.created_by.as_deref().unwrap_or("unknown"),
            "User provisioned"
        );

        let notification = match self
            .notify_administrators(&request, &distinguished_name)
            .await
        {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    error = %e,
                    "User created but administrators were not notified"
                );
                NotificationStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ProvisioningOutcome {
            request_id,
            account_name: request.account_name,
            distinguished_name,
            created_at: Utc::now(),
            notification,
        })
    }
}
