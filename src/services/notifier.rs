//! Notification service - tells administrators about new accounts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::NotificationMessage;
use crate::errors::AppResult;
use crate::infra::MailTransport;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Notifier trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message; no retry.
    async fn send(&self, message: &NotificationMessage) -> AppResult<()>;
}

/// Notifier backed by a mail transport.
pub struct EmailNotifier {
    transport: Arc<dyn MailTransport>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &NotificationMessage) -> AppResult<()> {
        self.transport.send(message).await
    }
}
