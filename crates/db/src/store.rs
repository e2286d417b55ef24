//! Embedded document store.
//!
//! Collections live in memory behind a single `RwLock`, ordered by an
//! insertion sequence. When the store is opened with a path, every mutation
//! that changes a collection rewrites a JSON snapshot of all collections; a
//! failed snapshot write rolls the collection back.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::id::DocumentId;
use crate::index::IndexDefinition;

/// Field holding the store-assigned identity of every document.
pub const ID_FIELD: &str = "_id";

/// A schema-flexible stored record.
pub type Document = Map<String, Value>;

/// Position of a document in its collection's insertion order.
type Seq = u64;

#[derive(Debug, Clone, Default)]
struct Collection {
    indexes: Vec<IndexDefinition>,
    documents: BTreeMap<Seq, Document>,
    next_seq: Seq,
}

impl Collection {
    fn push(&mut self, document: Document) {
        self.documents.insert(self.next_seq, document);
        self.next_seq += 1;
    }

    fn seq_of(&self, id: DocumentId) -> Option<Seq> {
        let filter = Filter::id(id);
        self.first_match(&filter)
    }

    fn first_match(&self, filter: &Filter) -> Option<Seq> {
        self.documents
            .iter()
            .find(|(_, d)| filter.matches(d))
            .map(|(seq, _)| *seq)
    }

    /// Reject `document` if it collides with another document on a unique index.
    fn check_unique(
        &self,
        collection: &str,
        document: &Document,
        exclude: Option<Seq>,
    ) -> StoreResult<()> {
        for index in self.indexes.iter().filter(|i| i.unique) {
            let Some(key) = index.key_for(document.get(&index.field)) else {
                continue;
            };
            let collides = self
                .documents
                .iter()
                .filter(|(seq, _)| Some(**seq) != exclude)
                .any(|(_, other)| index.key_for(other.get(&index.field)).as_ref() == Some(&key));
            if collides {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    index: index.name.clone(),
                    value: key,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: BTreeMap<String, CollectionSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionSnapshot {
    #[serde(default)]
    indexes: Vec<IndexDefinition>,
    #[serde(default)]
    documents: Vec<Document>,
}

impl State {
    fn to_snapshot(&self) -> Snapshot {
        let collections = self
            .collections
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    CollectionSnapshot {
                        indexes: c.indexes.clone(),
                        documents: c.documents.values().cloned().collect(),
                    },
                )
            })
            .collect();
        Snapshot { collections }
    }

    fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let mut collections = HashMap::new();
        for (name, stored) in snapshot.collections {
            let mut collection = Collection {
                indexes: stored.indexes,
                ..Collection::default()
            };
            for document in stored.documents {
                let raw = document
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                raw.parse::<DocumentId>()?;
                collection.push(document);
            }
            collections.insert(name, collection);
        }
        Ok(Self { collections })
    }
}

#[derive(Debug)]
struct Inner {
    state: RwLock<State>,
    path: Option<PathBuf>,
}

/// Shared handle to the document store. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    inner: Arc<Inner>,
}

impl DocumentStore {
    /// A store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State::default()),
                path: None,
            }),
        }
    }

    /// Open a file-backed store, loading the snapshot at `path` if it exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => State::from_snapshot(serde_json::from_slice(&bytes)?)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            target: "vitrine-db",
            path = %path.display(),
            collections = state.collections.len(),
            "document store opened"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                path: Some(path),
            }),
        })
    }

    /// Register an index on a collection. Re-declaring an index by name replaces it.
    ///
    /// Fails with `DuplicateKey` if existing documents already violate a unique index.
    pub async fn ensure_index(&self, index: IndexDefinition) -> StoreResult<()> {
        let collection = index.collection.clone();
        self.mutate(&collection, |c| {
            if c.indexes.contains(&index) {
                return Ok(((), false));
            }
            let mut candidate = c.clone();
            candidate.indexes.retain(|i| i.name != index.name);
            candidate.indexes.push(index.clone());
            for (seq, document) in &candidate.documents {
                candidate.check_unique(&index.collection, document, Some(*seq))?;
            }
            *c = candidate;
            Ok(((), true))
        })
        .await?;

        tracing::debug!(
            target: "vitrine-db",
            collection = %collection,
            index = %index.name,
            "index ensured"
        );
        Ok(())
    }

    /// First document matching `filter`, in insertion order.
    pub async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let state = self.inner.state.read().await;
        Ok(state.collections.get(collection).and_then(|c| {
            c.documents
                .values()
                .find(|d| filter.matches(d))
                .cloned()
        }))
    }

    /// Every document matching `filter`, in insertion order.
    pub async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let state = self.inner.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .map(|c| {
                c.documents
                    .values()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let state = self.inner.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .map(|c| c.documents.values().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    /// Insert a document under a freshly assigned identity.
    pub async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::generate();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.mutate(collection, |c| {
            c.check_unique(collection, &document, None)?;
            c.push(document);
            Ok(((), true))
        })
        .await?;

        tracing::debug!(target: "vitrine-db", collection, %id, "document inserted");
        Ok(id)
    }

    /// Insert several documents. Either all are inserted or none are.
    pub async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<Vec<DocumentId>> {
        let ids = self
            .mutate(collection, |c| {
                let mut staged = c.clone();
                let mut ids = Vec::with_capacity(documents.len());
                for mut document in documents {
                    let id = DocumentId::generate();
                    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
                    staged.check_unique(collection, &document, None)?;
                    staged.push(document);
                    ids.push(id);
                }
                let changed = !ids.is_empty();
                *c = staged;
                Ok((ids, changed))
            })
            .await?;

        tracing::debug!(
            target: "vitrine-db",
            collection,
            inserted = ids.len(),
            "documents inserted"
        );
        Ok(ids)
    }

    /// Replace the document stored under `id`, keeping its position.
    /// Returns the number of documents matched.
    pub async fn replace_one(
        &self,
        collection: &str,
        id: DocumentId,
        mut document: Document,
    ) -> StoreResult<u64> {
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        let matched = self
            .mutate(collection, |c| {
                let Some(seq) = c.seq_of(id) else {
                    return Ok((0, false));
                };
                c.check_unique(collection, &document, Some(seq))?;
                c.documents.insert(seq, document);
                Ok((1, true))
            })
            .await?;

        tracing::debug!(target: "vitrine-db", collection, %id, matched, "document replaced");
        Ok(matched)
    }

    /// Remove the first document matching `filter` and return it.
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let removed = self
            .mutate(collection, |c| {
                let removed = c.first_match(filter).and_then(|seq| c.documents.remove(&seq));
                let changed = removed.is_some();
                Ok((removed, changed))
            })
            .await?;

        tracing::debug!(
            target: "vitrine-db",
            collection,
            deleted = removed.is_some(),
            "delete one"
        );
        Ok(removed)
    }

    /// Remove every document matching `filter`. Returns the number removed.
    pub async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.mutate(collection, |c| {
            let before = c.documents.len();
            c.documents.retain(|_, d| !filter.matches(d));
            let removed = (before - c.documents.len()) as u64;
            Ok((removed, removed > 0))
        })
        .await
    }

    /// Run `op` against a collection under the write lock. `op` reports
    /// whether it changed the collection; only changes reach the snapshot.
    async fn mutate<R>(
        &self,
        collection: &str,
        op: impl FnOnce(&mut Collection) -> StoreResult<(R, bool)>,
    ) -> StoreResult<R> {
        let mut state = self.inner.state.write().await;
        let existed = state.collections.contains_key(collection);
        let entry = state.collections.entry(collection.to_string()).or_default();
        let backup = self.inner.path.as_ref().map(|_| entry.clone());

        let (out, changed) = match op(entry) {
            Ok(outcome) => outcome,
            Err(err) => {
                if !existed {
                    state.collections.remove(collection);
                }
                return Err(err);
            }
        };

        if !changed {
            if !existed {
                state.collections.remove(collection);
            }
            return Ok(out);
        }

        if let Some(path) = &self.inner.path {
            if let Err(err) = write_snapshot(path, &state).await {
                match backup {
                    Some(backup) if existed => {
                        state.collections.insert(collection.to_string(), backup);
                    }
                    _ => {
                        state.collections.remove(collection);
                    }
                }
                tracing::error!(
                    target: "vitrine-db",
                    path = %path.display(),
                    error = %err,
                    "snapshot write failed; collection rolled back"
                );
                return Err(err);
            }
        }

        Ok(out)
    }
}

async fn write_snapshot(path: &Path, state: &State) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(&state.to_snapshot())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
