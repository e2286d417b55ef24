//! Typed repository layer over the document store.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::id::DocumentId;
use crate::store::{Document, DocumentStore, ID_FIELD};

/// A record type persisted in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Store-assigned identity, `None` until inserted.
    fn id(&self) -> Option<DocumentId>;

    fn set_id(&mut self, id: DocumentId);
}

/// Entity-typed CRUD contract. Handlers depend on this, never on the store.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// First entity matching `filter`. Absence is `Ok(None)`, not an error.
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>>;

    /// Resolve an identity string. Fails with `InvalidIdentity` if `id` is malformed.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    async fn filter_by(&self, filter: &Filter) -> StoreResult<Vec<T>>;

    /// Persist a new entity and write the assigned identity back into it.
    async fn insert_one(&self, entity: &mut T) -> StoreResult<DocumentId>;

    async fn insert_many(&self, entities: &mut [T]) -> StoreResult<Vec<DocumentId>>;

    /// Replace the stored record sharing the entity's identity.
    ///
    /// Fails with `NotFound` when the entity has no identity or nothing matches it.
    async fn replace_one(&self, entity: &T) -> StoreResult<()>;

    /// Delete at most one matching entity. Returns whether one was removed.
    async fn delete_one(&self, filter: &Filter) -> StoreResult<bool>;

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64>;
}

/// [`Repository`] implementation bound to `T::COLLECTION` in a [`DocumentStore`].
#[derive(Debug)]
pub struct StoreRepository<T> {
    store: DocumentStore,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for StoreRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> StoreRepository<T> {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn to_document(entity: &T) -> StoreResult<Document> {
        match serde_json::to_value(entity)? {
            Value::Object(mut document) => {
                document.remove(ID_FIELD);
                Ok(document)
            }
            _ => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "entities in '{}' must serialize to a JSON object",
                T::COLLECTION
            ))
            .into()),
        }
    }

    fn from_document(document: Document) -> StoreResult<T> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for StoreRepository<T> {
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let id: DocumentId = id.parse()?;
        self.find_one(&Filter::id(id)).await
    }

    async fn filter_by(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }

    async fn insert_one(&self, entity: &mut T) -> StoreResult<DocumentId> {
        let document = Self::to_document(entity)?;
        let id = self.store.insert_one(T::COLLECTION, document).await?;
        entity.set_id(id);
        Ok(id)
    }

    async fn insert_many(&self, entities: &mut [T]) -> StoreResult<Vec<DocumentId>> {
        let documents = entities
            .iter()
            .map(Self::to_document)
            .collect::<StoreResult<Vec<_>>>()?;
        let ids = self.store.insert_many(T::COLLECTION, documents).await?;
        for (entity, id) in entities.iter_mut().zip(&ids) {
            entity.set_id(*id);
        }
        Ok(ids)
    }

    async fn replace_one(&self, entity: &T) -> StoreResult<()> {
        let not_found = |id: String| StoreError::NotFound {
            collection: T::COLLECTION.to_string(),
            id,
        };
        let id = entity.id().ok_or_else(|| not_found("<unsaved>".to_string()))?;
        let document = Self::to_document(entity)?;
        match self.store.replace_one(T::COLLECTION, id, document).await? {
            0 => Err(not_found(id.to_string())),
            _ => Ok(()),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> StoreResult<bool> {
        Ok(self.store.delete_one(T::COLLECTION, filter).await?.is_some())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let id: DocumentId = id.parse()?;
        self.delete_one(&Filter::id(id)).await
    }

    async fn delete_many(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.delete_many(T::COLLECTION, filter).await
    }
}
