//! Persistence middleware for a reactive store.
//!
//! A three-lane state (query, persist, delete) folded by a pure reducer, an
//! effect middleware that talks to a pluggable [`StorageAdapter`], and a
//! [`Store`] that serializes every action through one loop.

pub mod adapter;
pub mod config;
pub mod logging;
pub mod middleware;
pub mod mvi;
pub mod persistence;
pub mod store;

pub use adapter::{ClosureAdapter, FetchStream, StorageAdapter};
pub use persistence::{
    Change, Diff, DiffError, FetchResult, PersistenceAction, PersistenceError, PersistenceState,
    ProcessState, RequestState,
};
pub use store::{Dispatcher, Store, StoreError};
