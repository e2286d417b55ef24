//! Command handlers for product operations.

mod create;
mod remove;
mod update;

use std::sync::Arc;

use vitrine_db::StoreError;
use vitrine_kernel::{settings::UpdateMode, NotificationContext, NotificationKind};

pub use create::CreateProductCommandHandler;
pub use remove::RemoveProductCommandHandler;
pub use update::UpdateProductCommandHandler;

use super::repository::ProductRepository;

pub const PRODUCT_CREATED: &str = "ok";
pub const PRODUCT_UPDATED: &str = "ok";
pub const PRODUCT_DELETED: &str = "Product deleted!";

/// One handler per command, sharing a repository.
#[derive(Clone)]
pub struct ProductHandlers {
    pub create: Arc<CreateProductCommandHandler>,
    pub remove: Arc<RemoveProductCommandHandler>,
    pub update: Arc<UpdateProductCommandHandler>,
    pub repository: ProductRepository,
}

impl ProductHandlers {
    pub fn new(repository: ProductRepository, update_mode: UpdateMode) -> Self {
        Self {
            create: Arc::new(CreateProductCommandHandler::new(repository.clone())),
            remove: Arc::new(RemoveProductCommandHandler::new(repository.clone())),
            update: Arc::new(UpdateProductCommandHandler::new(
                repository.clone(),
                update_mode,
            )),
            repository,
        }
    }
}

fn duplicate_message(title: &str) -> String {
    format!("Product with title: '{}' already exists!", title)
}

/// Record a store failure under the matching notification kind.
fn record_store_error(notifications: &mut NotificationContext, handler: &str, err: &StoreError) {
    let kind = match err {
        StoreError::InvalidIdentity(_) => NotificationKind::InvalidIdentity,
        StoreError::DuplicateKey { .. } => NotificationKind::Duplicate,
        StoreError::NotFound { .. } => NotificationKind::NotFound,
        StoreError::Serialization(_) | StoreError::Io(_) => NotificationKind::Persistence,
    };

    if kind == NotificationKind::Persistence {
        tracing::error!(handler, error = %err, "store operation failed");
    } else {
        tracing::warn!(handler, error = %err, "store rejected operation");
    }

    notifications.add_error(kind, err.to_string());
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use vitrine_db::{DocumentId, Filter, Repository, StoreError, StoreResult};

    use crate::modules::products::models::Product;

    fn io_failure() -> StoreError {
        StoreError::Io(std::io::Error::other("disk unavailable"))
    }

    /// Repository whose reads succeed with `found` and whose writes fail.
    pub(crate) struct FailingWrites {
        pub(crate) found: Option<Product>,
    }

    #[async_trait]
    impl Repository<Product> for FailingWrites {
        async fn find_one(&self, _filter: &Filter) -> StoreResult<Option<Product>> {
            Ok(self.found.clone())
        }

        async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
            id.parse::<DocumentId>()?;
            Ok(self.found.clone())
        }

        async fn filter_by(&self, _filter: &Filter) -> StoreResult<Vec<Product>> {
            Ok(self.found.clone().into_iter().collect())
        }

        async fn insert_one(&self, _entity: &mut Product) -> StoreResult<DocumentId> {
            Err(io_failure())
        }

        async fn insert_many(&self, _entities: &mut [Product]) -> StoreResult<Vec<DocumentId>> {
            Err(io_failure())
        }

        async fn replace_one(&self, _entity: &Product) -> StoreResult<()> {
            Err(io_failure())
        }

        async fn delete_one(&self, _filter: &Filter) -> StoreResult<bool> {
            Err(io_failure())
        }

        async fn delete_by_id(&self, _id: &str) -> StoreResult<bool> {
            Err(io_failure())
        }

        async fn delete_many(&self, _filter: &Filter) -> StoreResult<u64> {
            Err(io_failure())
        }
    }
}
