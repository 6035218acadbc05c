//! Storage adapter capability consumed by the middleware.
//!
//! The middleware only ever talks to a backend through [`StorageAdapter`].
//! Two implementations ship with the crate:
//! - [`ClosureAdapter`] - every operation replaceable by a closure (tests, glue)
//! - [`memory::MemoryAdapter`] - in-process backend with live queries

mod closure;
pub mod memory;

use std::fmt::Debug;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::persistence::{DiffError, FetchResult, PersistenceAction, PersistenceState};

pub use closure::ClosureAdapter;

/// Stream of query emissions. An `Err` item terminates the query.
pub type FetchStream<E, Err> = BoxStream<'static, Result<FetchResult<E>, Err>>;

/// Action type for a given adapter.
pub type AdapterAction<A> = PersistenceAction<
    <A as StorageAdapter>::Element,
    <A as StorageAdapter>::Error,
    <A as StorageAdapter>::Request,
>;

/// State type for a given adapter.
pub type AdapterState<A> = PersistenceState<
    <A as StorageAdapter>::Element,
    <A as StorageAdapter>::Error,
    <A as StorageAdapter>::Request,
>;

/// Capability interface implemented by a concrete backend.
///
/// Operations never panic on backend failures; every failure is returned
/// as `Self::Error` and ends up in a `Failed` lane.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Application-level value being stored.
    type Element: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Query descriptor understood by [`observe`](Self::observe).
    type Request: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Backend error surfaced in failed lanes.
    type Error: std::error::Error + Clone + PartialEq + From<DiffError> + Send + Sync + 'static;

    /// Insert or update `element`.
    async fn save(&self, element: &Self::Element) -> Result<(), Self::Error>;

    /// Remove `element`.
    async fn delete(&self, element: &Self::Element) -> Result<(), Self::Error>;

    /// Observe `request`.
    ///
    /// Dropping the returned stream must tear the subscription down.
    fn observe(&self, request: &Self::Request) -> FetchStream<Self::Element, Self::Error>;
}
