use async_trait::async_trait;
use vitrine_db::Repository;
use vitrine_kernel::{CommandHandler, GenericResponse, NotificationContext, NotificationKind};

use super::{record_store_error, PRODUCT_DELETED};
use crate::modules::products::{
    commands::RemoveProductCommand,
    repository::{by_title, ProductRepository},
};

/// Deletes the product whose title matches, ignoring case.
pub struct RemoveProductCommandHandler {
    repository: ProductRepository,
}

impl RemoveProductCommandHandler {
    pub fn new(repository: ProductRepository) -> Self {
        Self { repository }
    }
}

fn not_found_message(title: &str) -> String {
    format!("Product with title: '{}' not found!", title)
}

#[async_trait]
impl CommandHandler<RemoveProductCommand> for RemoveProductCommandHandler {
    fn name(&self) -> &'static str {
        "remove_product"
    }

    async fn handle(
        &self,
        command: RemoveProductCommand,
        mut notifications: NotificationContext,
    ) -> GenericResponse {
        let title = command.title.to_lowercase();
        let filter = by_title(&title);

        match self.repository.find_one(&filter).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                notifications.add_error(NotificationKind::NotFound, not_found_message(&title));
                return GenericResponse::failure(notifications);
            }
            Err(err) => {
                record_store_error(&mut notifications, self.name(), &err);
                return GenericResponse::failure(notifications);
            }
        }

        match self.repository.delete_one(&filter).await {
            Ok(true) => {
                tracing::info!(%title, "product deleted");
                GenericResponse::ok(PRODUCT_DELETED)
            }
            // Removed by someone else between lookup and delete
            Ok(false) => {
                notifications.add_error(NotificationKind::NotFound, not_found_message(&title));
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
    use crate::modules::products::models::Product;
    use crate::modules::products::repository::product_repository;
    use std::sync::Arc;
    use vitrine_db::{DocumentStore, Filter};
    use vitrine_kernel::dispatch;

    fn command(title: &str) -> RemoveProductCommand {
        RemoveProductCommand {
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn removes_matching_product_only() {
        let repository = product_repository(DocumentStore::in_memory());
        repository
            .insert_one(&mut Product::new("Widget", "", 1.0, true))
            .await
            .unwrap();
        repository
            .insert_one(&mut Product::new("Gadget", "", 2.0, true))
            .await
            .unwrap();
        let handler = RemoveProductCommandHandler::new(repository.clone());

        let response = dispatch(&handler, command("wIdGeT")).await;
        assert_eq!(response, GenericResponse::ok("Product deleted!"));

        let remaining = repository.filter_by(&Filter::All).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title(), "Gadget");
    }

    #[tokio::test]
    async fn missing_title_reports_lowercased_not_found() {
        let repository = product_repository(DocumentStore::in_memory());
        repository
            .insert_one(&mut Product::new("Gadget", "", 2.0, true))
            .await
            .unwrap();
        let handler = RemoveProductCommandHandler::new(repository.clone());

        let response = dispatch(&handler, command("Widget")).await;
        assert_eq!(response.notifications.len(), 1);
        assert_eq!(response.notifications[0].kind, NotificationKind::NotFound);
        assert_eq!(
            response.notifications[0].value,
            "Product with title: 'widget' not found!"
        );
        assert_eq!(repository.filter_by(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_failure_forwards_store_message() {
        let handler = RemoveProductCommandHandler::new(Arc::new(FailingWrites {
            found: Some(Product::new("Widget", "", 1.0, true)),
        }));

        let response = dispatch(&handler, command("Widget")).await;
        assert!(response.result.is_none());
        assert_eq!(response.notifications[0].kind, NotificationKind::Persistence);
        assert!(response.notifications[0].value.contains("disk unavailable"));
    }

    #[tokio::test]
    async fn record_removed_after_lookup_reports_not_found() {
        // Lookup succeeds, then a concurrent remover deletes the record first.
        struct RacedRemoval(ProductRepository);

        #[async_trait]
        impl vitrine_db::Repository<Product> for RacedRemoval {
            async fn find_one(&self, f: &Filter) -> vitrine_db::StoreResult<Option<Product>> {
                let found = self.0.find_one(f).await?;
                self.0.delete_one(f).await?;
                Ok(found)
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

        let inner = product_repository(DocumentStore::in_memory());
        inner
            .insert_one(&mut Product::new("Widget", "", 1.0, true))
            .await
            .unwrap();
        let handler = RemoveProductCommandHandler::new(Arc::new(RacedRemoval(inner.clone())));

        let response = dispatch(&handler, command("Widget")).await;
        assert!(response.result.is_none());
        assert_eq!(response.notifications.len(), 1);
        assert_eq!(response.notifications[0].kind, NotificationKind::NotFound);
        assert_eq!(
            response.notifications[0].value,
            "Product with title: 'widget' not found!"
        );
        assert!(inner.filter_by(&Filter::All).await.unwrap().is_empty());
    }
}
