use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::notification::{Notification, NotificationContext};

/// Uniform envelope returned for every command.
///
/// A well-formed response has either `result` set or a non-empty
/// `notifications` list, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericResponse {
    pub result: Option<String>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl GenericResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            notifications: Vec::new(),
        }
    }

    /// Failure response carrying everything recorded in `ctx`.
    pub fn failure(ctx: NotificationContext) -> Self {
        Self {
            result: None,
            notifications: ctx.into_notifications(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Logical failures travel in the body; the status is always 200.
impl IntoResponse for GenericResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
