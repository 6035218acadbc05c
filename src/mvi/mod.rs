//! Model-View-Intent (MVI) primitives.
//!
//! This module provides the base traits for the unidirectional data flow
//! that the persistence store is built on.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Middleware ──→ (effect) ──→ Action
//!    │
//!    └──→ Reducer ──→ State ──→ Subscribers
//! ```
//!
//! - **State**: Immutable representation of the store
//! - **Action**: Caller intents and effect results
//! - **Reducer**: Pure function that transforms state based on actions

mod action;
mod reducer;
mod state;

pub use action::Action;
pub use reducer::Reducer;
pub use state::StoreState;
