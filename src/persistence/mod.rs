//! Persistence lanes: actions, state, reducers and list reconciliation.
//!
//! # Architecture
//!
//! Uses MVI (Model-View-Intent) pattern:
//! - `action.rs` - Caller intents and effect results
//! - `state.rs` - Query lane plus persist/delete lanes
//! - `reducer.rs` - State transitions (pure, no side effects)
//! - `diff.rs` / `fetch.rs` - Ordered patches and their reconciliation

pub mod action;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod reducer;
pub mod state;

pub use action::{PersistenceAction, ProcessAction, ProcessLane, RequestAction};
pub use diff::{Change, Diff, DiffError};
pub use error::PersistenceError;
pub use fetch::{reconcile, FetchResult};
pub use reducer::{PersistenceReducer, ProcessReducer, RequestReducer};
pub use state::{PersistenceState, ProcessState, RequestState};
