//! Error types for the document store

use thiserror::Error;

/// Errors raised by the document store and the repository layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("'{0}' is not a valid document identity")]
    InvalidIdentity(String),

    #[error("duplicate key '{value}' violates unique index '{index}' on collection '{collection}'")]
    DuplicateKey {
        collection: String,
        index: String,
        value: String,
    },

    #[error("no document with id '{id}' in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the store rejected a write because of a unique index.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
