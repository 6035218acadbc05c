//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_adapter;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use persistence_middleware::adapter::memory::Persistable;

pub use mock_adapter::MockAdapter;

/// Next state published by a store, failing the test after two seconds.
pub async fn next_state<S>(states: &mut mpsc::UnboundedReceiver<S>) -> S {
    tokio::time::timeout(Duration::from_secs(2), states.recv())
        .await
        .expect("timed out waiting for the next state")
        .expect("state channel closed")
}

/// Skip published states until one satisfies `done`.
pub async fn state_matching<S, F>(states: &mut mpsc::UnboundedReceiver<S>, done: F) -> S
where
    F: Fn(&S) -> bool,
{
    loop {
        let state = next_state(states).await;
        if done(&state) {
            return state;
        }
    }
}

/// Element type for memory adapter tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub year: u16,
}

impl Track {
    pub fn new(id: u32, title: &str, artist: &str, year: u16) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            year,
        }
    }
}

impl Persistable for Track {
    fn key(&self) -> String {
        format!("track-{:03}", self.id)
    }
}
