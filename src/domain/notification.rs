//! Notification message.

use serde::Serialize;

/// One outgoing mail message; built and dropped per send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: String,
}

impl NotificationMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}
