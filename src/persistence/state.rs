//! Three-lane state of the persistence store.

use crate::mvi::StoreState;

/// Query lane.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<E, Err, R> {
    Initial,
    Loading,
    Received(Vec<E>),
    Failed { error: Err, request: R },
    Canceled,
}

/// Save or delete lane.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessState<E, Err> {
    Initial,
    Processing,
    Succeeded,
    Failed { error: Err, element: E },
}

/// Complete store state: one query lane and two process lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceState<E, Err, R> {
    pub request: RequestState<E, Err, R>,
    pub persist: ProcessState<E, Err>,
    pub delete: ProcessState<E, Err>,
}

impl<E, Err, R> Default for RequestState<E, Err, R> {
    fn default() -> Self {
        RequestState::Initial
    }
}

impl<E, Err> Default for ProcessState<E, Err> {
    fn default() -> Self {
        ProcessState::Initial
    }
}

impl<E, Err, R> Default for PersistenceState<E, Err, R> {
    fn default() -> Self {
        Self::initial()
    }
}

impl<E, Err, R> StoreState for PersistenceState<E, Err, R>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static,
    R: Clone + PartialEq + Send + 'static,
{
}

impl<E, Err, R> StoreState for RequestState<E, Err, R>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static,
    R: Clone + PartialEq + Send + 'static,
{
}

impl<E, Err> StoreState for ProcessState<E, Err>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static,
{
}

impl<E, Err, R> PersistenceState<E, Err, R> {
    /// All three lanes at their initial variant.
    pub fn initial() -> Self {
        Self {
            request: RequestState::Initial,
            persist: ProcessState::Initial,
            delete: ProcessState::Initial,
        }
    }
}

impl<E, Err, R> RequestState<E, Err, R> {
    /// The materialized list, if one has been received.
    pub fn elements(&self) -> Option<&[E]> {
        match self {
            RequestState::Received(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error(&self) -> Option<&Err> {
        match self {
            RequestState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<E, Err> ProcessState<E, Err> {
    pub fn is_processing(&self) -> bool {
        matches!(self, ProcessState::Processing)
    }

    /// True once the lane holds a result (`Succeeded` or `Failed`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Succeeded | ProcessState::Failed { .. })
    }

    pub fn error(&self) -> Option<&Err> {
        match self {
            ProcessState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
