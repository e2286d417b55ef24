//! Binds `Product` to its collection in the document store.

use std::sync::Arc;

use vitrine_db::{DocumentId, DocumentStore, Entity, Filter, IndexDefinition, Repository, StoreRepository};

use super::models::Product;

pub const COLLECTION: &str = "products";
pub const TITLE_FIELD: &str = "title";
pub const TITLE_INDEX: &str = "products_title_unique";

impl Entity for Product {
    const COLLECTION: &'static str = COLLECTION;

    fn id(&self) -> Option<DocumentId> {
        Product::id(self)
    }

    fn set_id(&mut self, id: DocumentId) {
        Product::set_id(self, id);
    }
}

/// Shared handle to the product repository.
pub type ProductRepository = Arc<dyn Repository<Product>>;

pub fn product_repository(store: DocumentStore) -> ProductRepository {
    Arc::new(StoreRepository::<Product>::new(store))
}

/// Case-insensitive title match.
pub fn by_title(title: &str) -> Filter {
    Filter::eq_ignore_case(TITLE_FIELD, title)
}

/// Store-side guard against two products sharing a title in any case.
pub fn title_index() -> IndexDefinition {
    IndexDefinition::unique(TITLE_INDEX, COLLECTION, TITLE_FIELD).case_insensitive()
}
