use async_trait::async_trait;
use vitrine_db::Repository;
use vitrine_kernel::{
    settings::UpdateMode, CommandHandler, GenericResponse, NotificationContext, NotificationKind,
};

use super::{duplicate_message, record_store_error, PRODUCT_UPDATED};
use crate::modules::products::{
    commands::UpdateProductCommand, models::Product, repository::ProductRepository,
};

/// Looks a product up by identity and writes it back.
///
/// With [`UpdateMode::ReplaceStored`] the looked-up record is written back
/// unchanged. With [`UpdateMode::ApplyRequest`] the request fields are
/// validated and replace the stored ones; absent fields keep their value.
pub struct UpdateProductCommandHandler {
    repository: ProductRepository,
    mode: UpdateMode,
}

impl UpdateProductCommandHandler {
    pub fn new(repository: ProductRepository, mode: UpdateMode) -> Self {
        Self { repository, mode }
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }
}

fn apply(stored: Product, command: UpdateProductCommand) -> Product {
    let id = stored.id();
    Product::new(
        command.title.unwrap_or_else(|| stored.title().to_string()),
        command
            .description
            .unwrap_or_else(|| stored.description().to_string()),
        command.price.unwrap_or(stored.price()),
        command.active.unwrap_or(stored.active()),
    )
    .with_id(id)
}

#[async_trait]
impl CommandHandler<UpdateProductCommand> for UpdateProductCommandHandler {
    fn name(&self) -> &'static str {
        "update_product"
    }

    async fn handle(
        &self,
        command: UpdateProductCommand,
        mut notifications: NotificationContext,
    ) -> GenericResponse {
        let stored = match self.repository.find_by_id(&command.id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                notifications.add_error(
                    NotificationKind::NotFound,
                    format!("Product with Id: '{}' not found!", command.id),
                );
                return GenericResponse::failure(notifications);
            }
            Err(err) => {
                record_store_error(&mut notifications, self.name(), &err);
                return GenericResponse::failure(notifications);
            }
        };

        let replacement = match self.mode {
            UpdateMode::ReplaceStored => stored,
            UpdateMode::ApplyRequest => {
                let product = apply(stored, command);
                if !product.is_valid() {
                    notifications.add_errors(
                        NotificationKind::Validation,
                        product.validation_result().iter().cloned(),
                    );
                    return GenericResponse::failure(notifications);
                }
                product
            }
        };

        match self.repository.replace_one(&replacement).await {
            Ok(()) => {
                tracing::info!(
                    id = ?replacement.id(),
                    mode = ?self.mode,
                    "product updated"
                );
                GenericResponse::ok(PRODUCT_UPDATED)
            }
            Err(err) if err.is_duplicate() => {
                notifications.add_error(
                    NotificationKind::Duplicate,
                    duplicate_message(replacement.title()),
                );
                GenericResponse::failure(notifications)
            }
            Err(err) => {
                record_store_error(&mut notifications, self.name(), &err);
                GenericResponse::failure(notifications)
            }
        }
    }
}
