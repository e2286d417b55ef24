use async_trait::async_trait;
use vitrine_db::Repository;
use vitrine_kernel::{CommandHandler, GenericResponse, NotificationContext, NotificationKind};

use super::{duplicate_message, record_store_error, PRODUCT_CREATED};
use crate::modules::products::{
    commands::CreateProductCommand,
    models::Product,
    repository::{by_title, ProductRepository},
};

/// Validates a new product, checks its title is free, and inserts it.
///
/// Duplicates that slip past the title lookup are rejected by the unique
/// title index and reported with the same `duplicate` notification.
pub struct CreateProductCommandHandler {
    repository: ProductRepository,
}

impl CreateProductCommandHandler {
    pub fn new(repository: ProductRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<CreateProductCommand> for CreateProductCommandHandler {
    fn name(&self) -> &'static str {
        "create_product"
    }

    async fn handle(
        &self,
        command: CreateProductCommand,
        mut notifications: NotificationContext,
    ) -> GenericResponse {
        let mut product = Product::new(
            command.title,
            command.description,
            command.price,
            command.active,
        );
        if !product.is_valid() {
            notifications.add_errors(
                NotificationKind::Validation,
                product.validation_result().iter().cloned(),
            );
            return GenericResponse::failure(notifications);
        }

        match self.repository.find_one(&by_title(product.title())).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                notifications.add_error(NotificationKind::Duplicate, duplicate_message(product.title()));
                return GenericResponse::failure(notifications);
            }
            Err(err) => {
                record_store_error(&mut notifications, self.name(), &err);
                return GenericResponse::failure(notifications);
            }
        }

        match self.repository.insert_one(&mut product).await {
            Ok(id) => {
                tracing::info!(%id, title = %product.title(), "product created");
                GenericResponse::ok(PRODUCT_CREATED)
            }
            Err(err) if err.is_duplicate() => {
                notifications.add_error(NotificationKind::Duplicate, duplicate_message(product.title()));
                GenericResponse::failure(notifications)
            }
            Err(err) => {
                record_store_error(&mut notifications, self.name(), &err);
                GenericResponse::failure(notifications)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::products::handlers::test_support::FailingWrites;
    use crate::modules::products::repository::{product_repository, title_index};
    use std::sync::Arc;
    use vitrine_db::{DocumentStore, Filter};
    use vitrine_kernel::dispatch;

    fn command(title: &str, price: f64) -> CreateProductCommand {
        CreateProductCommand {
            title: title.to_string(),
            description: "A widget".to_string(),
            price,
            active: true,
        }
    }

    #[tokio::test]
    async fn creates_new_product() {
        let repository = product_repository(DocumentStore::in_memory());
        let handler = CreateProductCommandHandler::new(repository.clone());

        let response = dispatch(&handler, command("Widget", 9.99)).await;
        assert_eq!(response, GenericResponse::ok("ok"));

        let stored = repository.filter_by(&Filter::All).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title(), "Widget");
        assert_eq!(stored[0].price(), 9.99);
        assert!(stored[0].id().is_some());
    }

    #[tokio::test]
    async fn invalid_input_reports_every_failure() {
        let repository = product_repository(DocumentStore::in_memory());
        let handler = CreateProductCommandHandler::new(repository.clone());

        let response = dispatch(&handler, command("", -1.0)).await;
        assert!(response.result.is_none());
        assert_eq!(response.notifications.len(), 2);
        assert!(response
            .notifications
            .iter()
            .all(|n| n.kind == NotificationKind::Validation && n.key == "Error"));
        assert!(repository.filter_by(&Filter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_case_insensitively() {
        let repository = product_repository(DocumentStore::in_memory());
        let handler = CreateProductCommandHandler::new(repository.clone());

        dispatch(&handler, command("Widget", 9.99)).await;
        let response = dispatch(&handler, command("WIDGET", 1.0)).await;

        assert_eq!(response.notifications.len(), 1);
        assert_eq!(response.notifications[0].kind, NotificationKind::Duplicate);
        assert_eq!(
            response.notifications[0].value,
            "Product with title: 'WIDGET' already exists!"
        );
        assert_eq!(repository.filter_by(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn index_violation_is_reported_as_duplicate() {
        // Simulates losing the race: the lookup sees nothing, the index still refuses.
        struct BlindLookup(ProductRepository);

        #[async_trait]
        impl vitrine_db::Repository<Product> for BlindLookup {
            async fn find_one(&self, _f: &Filter) -> vitrine_db::StoreResult<Option<Product>> {
                Ok(None)
            }
            async fn find_by_id(&self, id: &str) -> vitrine_db::StoreResult<Option<Product>> {
                self.0.find_by_id(id).await
            }
            async fn filter_by(&self, f: &Filter) -> vitrine_db::StoreResult<Vec<Product>> {
                self.0.filter_by(f).await
            }
            async fn insert_one(&self, e: &mut Product) -> vitrine_db::StoreResult<vitrine_db::DocumentId> {
                self.0.insert_one(e).await
            }
            async fn insert_many(
                &self,
                e: &mut [Product],
            ) -> vitrine_db::StoreResult<Vec<vitrine_db::DocumentId>> {
                self.0.insert_many(e).await
            }
            async fn replace_one(&self, e: &Product) -> vitrine_db::StoreResult<()> {
                self.0.replace_one(e).await
            }
            async fn delete_one(&self, f: &Filter) -> vitrine_db::StoreResult<bool> {
                self.0.delete_one(f).await
            }
            async fn delete_by_id(&self, id: &str) -> vitrine_db::StoreResult<bool> {
                self.0.delete_by_id(id).await
            }
            async fn delete_many(&self, f: &Filter) -> vitrine_db::StoreResult<u64> {
                self.0.delete_many(f).await
            }
        }

        let store = DocumentStore::in_memory();
        store.ensure_index(title_index()).await.unwrap();
        let inner = product_repository(store);
        let handler = CreateProductCommandHandler::new(Arc::new(BlindLookup(inner.clone())));

        dispatch(&handler, command("Widget", 9.99)).await;
        let response = dispatch(&handler, command("widget", 9.99)).await;

        assert_eq!(response.notifications[0].kind, NotificationKind::Duplicate);
        assert_eq!(inner.filter_by(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_becomes_persistence_notification() {
        let handler = CreateProductCommandHandler::new(Arc::new(FailingWrites { found: None }));

        let response = dispatch(&handler, command("Widget", 9.99)).await;
        assert_eq!(response.notifications.len(), 1);
        assert_eq!(response.notifications[0].kind, NotificationKind::Persistence);
        assert!(response.notifications[0].value.contains("disk unavailable"));
    }
}
