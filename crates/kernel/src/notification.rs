//! Per-request accumulation of failure and warning messages.

use serde::{Deserialize, Serialize};

/// Category used for every failure notification.
pub const ERROR_KEY: &str = "Error";

/// Machine-readable classification of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Validation,
    NotFound,
    Duplicate,
    Persistence,
    InvalidIdentity,
}

/// A `(category, message)` pair, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub key: String,
    pub value: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(key: impl Into<String>, value: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind,
        }
    }

    pub fn error(value: impl Into<String>, kind: NotificationKind) -> Self {
        Self::new(ERROR_KEY, value, kind)
    }
}

/// Append-only notification list owned by a single request.
///
/// A fresh context is created per dispatch and consumed into the response,
/// so nothing is shared between requests.
#[derive(Debug, Default)]
pub struct NotificationContext {
    notifications: Vec<Notification>,
}

impl NotificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, notification: Notification) {
        tracing::debug!(
            key = %notification.key,
            kind = ?notification.kind,
            message = %notification.value,
            "notification recorded"
        );
        self.notifications.push(notification);
    }

    pub fn add_error(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.add(Notification::error(message, kind));
    }

    /// Record every message under the same kind.
    pub fn add_errors<I, S>(&mut self, kind: NotificationKind, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.add_error(kind, message);
        }
    }

    pub fn has_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }
}
