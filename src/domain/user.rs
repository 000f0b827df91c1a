//! User creation request and its outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// A request to create one directory user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    pub account_name: String,
    pub display_name: String,
    pub email_address: String,
    /// Operator who submitted the request, when known
    pub created_by: Option<String>,
}

impl CreateUserRequest {
    pub fn new(
        account_name: impl Into<String>,
        display_name: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            display_name: display_name.into(),
            email_address: email_address.into(),
            created_by: None,
        }
    }

    /// Record the submitting operator
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Trim surrounding whitespace from every field.
    pub fn normalized(self) -> Self {
        Self {
            account_name: self.account_name.trim().to_string(),
            display_name: self.display_name.trim().to_string(),
            email_address: self.email_address.trim().to_string(),
            created_by: self
                .created_by
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }

    /// Check the invariants that must hold before the directory is called.
    pub fn ensure_valid(&self) -> AppResult<()> {
        if self.account_name.trim().is_empty() {
            return Err(AppError::invalid_argument("Account name is required"));
        }
        Ok(())
    }
}

/// Whether the administrators were told about the new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed { reason: String },
}

impl NotificationStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationStatus::Sent)
    }
}

/// Result of a successful account creation (never carries the password).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProvisioningOutcome {
    /// Correlates log lines for this request
    pub request_id: Uuid,
    #[schema(example = "jdoe")]
    pub account_name: String,
    #[schema(example = "CN=Jane Doe,OU=Staff,DC=example,DC=com")]
    pub distinguished_name: String,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Object, example = json!({"status": "sent"}))]
    pub notification: NotificationStatus,
}
