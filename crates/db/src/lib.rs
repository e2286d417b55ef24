//! Embedded document store for vitrine.
//!
//! Documents are schema-flexible JSON objects grouped into named collections.
//! The [`store::DocumentStore`] speaks in untyped documents and [`filter::Filter`]
//! predicates; the [`repository`] layer binds an [`repository::Entity`] type to
//! its collection at compile time and exposes typed CRUD operations.

pub mod error;
pub mod filter;
pub mod id;
pub mod index;
pub mod repository;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use id::DocumentId;
pub use index::IndexDefinition;
pub use repository::{Entity, Repository, StoreRepository};
pub use store::{Document, DocumentStore};
