//! Mail transport.
//!
//! With SMTP configured, messages go out through lettre's Tokio transport.
//! Without it, they are logged instead of sent.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailSettings;
use crate::domain::NotificationMessage;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Delivers one message.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> AppResult<()>;
}

/// Pick the transport for the configured settings.
pub fn mail_transport(settings: &MailSettings) -> Arc<dyn MailTransport> {
    match settings.smtp_host.as_deref() {
        Some(_) => Arc::new(SmtpMailer::new(settings.clone())),
        None => {
            tracing::warn!("SMTP not configured - notifications will be logged instead of sent");
            Arc::new(LogMailer)
        }
    }
}

/// SMTP delivery; a fresh transport is built for every message.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    fn transport(&self) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let host = self
            .settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::notification("SMTP host is not configured"))?;

        let builder = if self.settings.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::notification(format!("Invalid SMTP relay {}: {}", host, e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let mut builder = builder.port(self.settings.smtp_port);

        if let Some((user, pass)) = self.settings.smtp_credentials() {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(builder.build())
    }
}

/// Build the RFC 5322 message, rejecting malformed addresses.
pub fn build_message(message: &NotificationMessage) -> AppResult<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| {
            AppError::notification(format!("Invalid sender address {:?}: {}", message.from, e))
        })?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| {
            AppError::notification(format!("Invalid recipient address {:?}: {}", message.to, e))
        })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| AppError::notification(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &NotificationMessage) -> AppResult<()> {
        let email = build_message(message)?;
        let mailer = self.transport()?;

        tracing::info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            "Sending notification"
        );

        mailer
            .send(email)
            .await
            .map_err(|e| AppError::notification(format!("SMTP delivery failed: {}", e)))?;

        tracing::info!(to = %message.to, "Notification sent");
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, message: &NotificationMessage) -> AppResult<()> {
        build_message(message)?;

        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            message.from,
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}
