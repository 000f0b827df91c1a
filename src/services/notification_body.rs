//! Body of the account-created notification.
//!
//! The body is empty unless an operator supplies a Handlebars template via
//! `MAIL_BODY_TEMPLATE`.

use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;

use crate::config::MailSettings;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const BODY_TEMPLATE_NAME: &str = "account_created";

/// Variables available to the notification template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountCreated {
    pub account_name: String,
    pub display_name: String,
    pub email_address: String,
    /// Operator who submitted the request, `unknown` when not supplied
    pub created_by: String,
    pub distinguished_name: String,
}

/// Renders the notification body for a created account.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait BodyRenderer: Send + Sync {
    fn render(&self, account: &AccountCreated) -> AppResult<String>;
}

/// Pick the renderer for the configured settings.
pub fn body_renderer(settings: &MailSettings) -> AppResult<Arc<dyn BodyRenderer>> {
    match &settings.body_template {
        Some(path) => Ok(Arc::new(TemplateBody::from_file(path)?)),
        None => Ok(Arc::new(EmptyBody)),
    }
}

/// Always renders an empty body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl BodyRenderer for EmptyBody {
    fn render(&self, _account: &AccountCreated) -> AppResult<String> {
        Ok(String::new())
    }
}

/// Renders an operator-supplied Handlebars template in strict mode.
pub struct TemplateBody {
    handlebars: Handlebars<'static>,
}

impl TemplateBody {
    pub fn from_template_str(template: &str) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Plain-text mail
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(BODY_TEMPLATE_NAME, template)
            .map_err(|e| {
                AppError::invalid_argument(format!("Invalid notification template: {}", e))
            })?;

        Ok(Self { handlebars })
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            AppError::invalid_argument(format!(
                "Cannot read notification template {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %path.display(), "Loaded notification template");
        Self::from_template_str(&template)
    }
}

impl BodyRenderer for TemplateBody {
    fn render(&self, account: &AccountCreated) -> AppResult<String> {
        self.handlebars
            .render(BODY_TEMPLATE_NAME, account)
            .map_err(|e| {
                AppError::notification(format!("Error rendering notification body: {}", e))
            })
    }
}
