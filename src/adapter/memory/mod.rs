//! In-process storage backend with live queries.
//!
//! Elements are stored as JSON records keyed by [`Persistable::key`]. Every
//! save or delete commits a revision on a broadcast feed; observers re-run
//! their query on each revision and emit the difference to what they last
//! emitted.

mod container;
mod query;

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::MemoryConfig;
use crate::persistence::{Diff, FetchResult, PersistenceError};

use super::{FetchStream, StorageAdapter};

pub use container::{ConfigureFn, Records};
pub use query::{FieldFilter, Query, SortKey};

use container::Container;

/// Elements that can live in a [`MemoryAdapter`].
pub trait Persistable:
    Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + 'static
{
    /// Identity of the element; saving an element with an existing key
    /// replaces the stored record.
    fn key(&self) -> String;
}

struct Shared {
    container: Container,
    changes: broadcast::Sender<u64>,
    revision: AtomicU64,
}

impl Shared {
    fn commit(&self) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        // No receivers just means nobody is observing.
        let _ = self.changes.send(revision);
        revision
    }

    fn fetch<E: Persistable>(&self, query: &Query) -> Result<Vec<E>, PersistenceError> {
        let records = self.container.read();
        let mut matching: Vec<_> = records
            .iter()
            .filter(|(_, record)| query.matches(record))
            .collect();
        matching.sort_by(|(ka, a), (kb, b)| query.compare(a, b).then_with(|| ka.cmp(kb)));

        matching
            .into_iter()
            .map(|(key, record)| {
                serde_json::from_value(record.clone()).map_err(|e| PersistenceError::MappingFailed {
                    key: key.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// In-memory [`StorageAdapter`].
///
/// Cloning is cheap; clones share the same records.
pub struct MemoryAdapter<E> {
    shared: Arc<Shared>,
    _element: PhantomData<fn() -> E>,
}

impl<E> Clone for MemoryAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _element: PhantomData,
        }
    }
}

impl<E: Persistable> MemoryAdapter<E> {
    pub fn new(config: &MemoryConfig) -> Self {
        Self::from_parts(config, Records::new(), None)
    }

    pub fn builder(config: &MemoryConfig) -> MemoryAdapterBuilder<E> {
        MemoryAdapterBuilder {
            change_buffer: config.change_buffer,
            seed: Vec::new(),
            configure: None,
        }
    }

    fn from_parts(config: &MemoryConfig, seed: Records, configure: Option<ConfigureFn>) -> Self {
        let (changes, _) = broadcast::channel(config.change_buffer.max(1));
        Self {
            shared: Arc::new(Shared {
                container: Container::new(seed, configure),
                changes,
                revision: AtomicU64::new(0),
            }),
            _element: PhantomData,
        }
    }

    /// Number of committed writes so far.
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::SeqCst)
    }

    /// Store a raw record under `key`, bypassing element mapping.
    pub fn insert_record(
        &self,
        key: impl Into<String>,
        record: serde_json::Value,
    ) -> Result<(), PersistenceError> {
        self.shared.container.ensure_loaded()?;
        self.shared.container.write().insert(key.into(), record);
        self.shared.commit();
        Ok(())
    }

    /// Run `query` once.
    pub fn fetch(&self, query: &Query) -> Result<Vec<E>, PersistenceError> {
        self.shared.container.ensure_loaded()?;
        self.shared.fetch(query)
    }
}

#[async_trait]
impl<E: Persistable> StorageAdapter for MemoryAdapter<E> {
    type Element = E;
    type Request = Query;
    type Error = PersistenceError;

    async fn save(&self, element: &E) -> Result<(), PersistenceError> {
        self.shared.container.ensure_loaded()?;
        let key = element.key();
        let record = serde_json::to_value(element).map_err(|e| PersistenceError::MappingFailed {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.shared.container.write().insert(key, record);
        let revision = self.shared.commit();
        tracing::trace!(revision, "Memory adapter saved element");
        Ok(())
    }

    async fn delete(&self, element: &E) -> Result<(), PersistenceError> {
        self.shared.container.ensure_loaded()?;
        // Deleting something that is not stored is not an error.
        if self.shared.container.write().remove(&element.key()).is_some() {
            let revision = self.shared.commit();
            tracing::trace!(revision, "Memory adapter deleted element");
        }
        Ok(())
    }

    fn observe(&self, query: &Query) -> FetchStream<E, PersistenceError> {
        let shared = Arc::clone(&self.shared);
        let query = query.clone();
        // Subscribe before the first fetch so no revision is missed.
        let mut changes = shared.changes.subscribe();

        Box::pin(async_stream::stream! {
            if let Err(err) = shared.container.ensure_loaded() {
                yield Err(err);
                return;
            }

            let mut current: Vec<E> = match shared.fetch(&query) {
                Ok(elements) => elements,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };
            yield Ok(FetchResult::Snapshot(current.clone()));

            loop {
                match changes.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                let next: Vec<E> = match shared.fetch(&query) {
                    Ok(elements) => elements,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };
                let diff = Diff::between(&current, &next).inferring_moves();
                if diff.is_empty() {
                    continue;
                }
                current = next;
                yield Ok(FetchResult::Diff(diff));
            }
        })
    }
}

/// Builder for a [`MemoryAdapter`] with seed data or a load hook.
pub struct MemoryAdapterBuilder<E> {
    change_buffer: usize,
    seed: Vec<E>,
    configure: Option<ConfigureFn>,
}

impl<E: Persistable> MemoryAdapterBuilder<E> {
    /// Elements present once the container loads.
    pub fn seed(mut self, elements: impl IntoIterator<Item = E>) -> Self {
        self.seed.extend(elements);
        self
    }

    /// Hook run on first use. Returning `Err` makes the adapter unavailable.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut Records) -> Result<(), String> + Send + 'static,
    {
        self.configure = Some(Box::new(configure));
        self
    }

    /// # Errors
    /// Returns [`PersistenceError::MappingFailed`] if a seed element cannot be
    /// serialized.
    pub fn build(self) -> Result<MemoryAdapter<E>, PersistenceError> {
        let mut records = Records::new();
        for element in self.seed {
            let key = element.key();
            let record = serde_json::to_value(&element).map_err(|e| PersistenceError::MappingFailed {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            records.insert(key, record);
        }
        let config = MemoryConfig {
            change_buffer: self.change_buffer,
        };
        Ok(MemoryAdapter::from_parts(&config, records, self.configure))
    }
}
