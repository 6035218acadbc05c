//! Lazily loaded record container.

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use crate::persistence::PersistenceError;

/// Records keyed by element key.
pub type Records = BTreeMap<String, Value>;

/// Hook run once when the container loads. An `Err` makes the container
/// permanently unavailable.
pub type ConfigureFn = Box<dyn FnOnce(&mut Records) -> Result<(), String> + Send>;

enum ContainerState {
    Initial { configure: Option<ConfigureFn> },
    Loaded,
    LoadingFailed { reason: String },
}

/// Record storage that loads on first use.
///
/// Loading happens at most once: success is remembered, and so is failure,
/// which is reported as [`PersistenceError::AdapterUnavailable`] from then on.
pub struct Container {
    state: Mutex<ContainerState>,
    records: RwLock<Records>,
}

impl Container {
    pub fn new(seed: Records, configure: Option<ConfigureFn>) -> Self {
        Self {
            state: Mutex::new(ContainerState::Initial { configure }),
            records: RwLock::new(seed),
        }
    }

    /// Load the container if needed.
    pub fn ensure_loaded(&self) -> Result<(), PersistenceError> {
        let mut state = self.state.lock();
        let outcome = match &mut *state {
            ContainerState::Loaded => return Ok(()),
            ContainerState::LoadingFailed { reason } => {
                return Err(PersistenceError::AdapterUnavailable {
                    reason: reason.clone(),
                })
            }
            ContainerState::Initial { configure } => match configure.take() {
                Some(configure) => {
                    let mut records = self.records.write();
                    configure(&mut *records)
                }
                None => Ok(()),
            },
        };

        match outcome {
            Ok(()) => {
                tracing::debug!(records = self.records.read().len(), "Memory container loaded");
                *state = ContainerState::Loaded;
                Ok(())
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Memory container failed to load");
                *state = ContainerState::LoadingFailed {
                    reason: reason.clone(),
                };
                Err(PersistenceError::AdapterUnavailable { reason })
            }
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Records> {
        self.records.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Records> {
        self.records.write()
    }
}
