//! Command/handler indirection between the transport and the application core.

use async_trait::async_trait;

use crate::notification::NotificationContext;
use crate::response::GenericResponse;

/// Handles one command type.
///
/// The notification context is handed in per call and consumed into the
/// returned envelope; handlers never hold request state of their own.
#[async_trait]
pub trait CommandHandler<C: Send + 'static>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, command: C, notifications: NotificationContext) -> GenericResponse;
}

/// Run `command` through `handler` with a fresh notification context.
pub async fn dispatch<C, H>(handler: &H, command: C) -> GenericResponse
where
    C: Send + 'static,
    H: CommandHandler<C> + ?Sized,
{
    let response = handler.handle(command, NotificationContext::new()).await;

    if response.is_success() {
        tracing::info!(handler = handler.name(), "command succeeded");
    } else {
        tracing::warn!(
            handler = handler.name(),
            notifications = response.notifications.len(),
            "command failed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;

    struct Echo;

    #[async_trait]
    impl CommandHandler<String> for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn handle(&self, command: String, mut ctx: NotificationContext) -> GenericResponse {
            if command.is_empty() {
                ctx.add_error(NotificationKind::Validation, "empty");
                return GenericResponse::failure(ctx);
            }
            GenericResponse::ok(command)
        }
    }

    #[tokio::test]
    async fn dispatch_returns_handler_response() {
        assert_eq!(dispatch(&Echo, "hi".to_string()).await, GenericResponse::ok("hi"));
    }

    #[tokio::test]
    async fn each_dispatch_gets_a_fresh_context() {
        let failed = dispatch(&Echo, String::new()).await;
        assert_eq!(failed.notifications.len(), 1);

        let again = dispatch(&Echo, String::new()).await;
        assert_eq!(again.notifications.len(), 1);
    }
}
