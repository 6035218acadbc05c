//! Actions accepted by the persistence store.

use crate::mvi::Action;

use super::fetch::FetchResult;

/// Which process lane an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessLane {
    Persist,
    Delete,
}

/// Actions for the query lane.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestAction<E, Err, R> {
    /// Start observing `R`, superseding any running query.
    Request(R),

    /// The running query for `request` emitted a result.
    Receive { request: R, result: FetchResult<E> },

    /// Stop the running query.
    Cancel,

    /// The running query for `request` failed.
    Fail { error: Err, request: R },
}

/// Actions shared by the persist and delete lanes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessAction<E, Err> {
    Process(E),
    Succeed,
    Fail { error: Err, element: E },
}

/// Every action the persistence store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceAction<E, Err, R> {
    Request(RequestAction<E, Err, R>),
    Persist(ProcessAction<E, Err>),
    Delete(ProcessAction<E, Err>),
}

impl<E, Err, R> Action for PersistenceAction<E, Err, R>
where
    E: Send + 'static,
    Err: Send + 'static,
    R: Send + 'static,
{
}

impl<E, Err, R> Action for RequestAction<E, Err, R>
where
    E: Send + 'static,
    Err: Send + 'static,
    R: Send + 'static,
{
}

impl<E, Err> Action for ProcessAction<E, Err>
where
    E: Send + 'static,
    Err: Send + 'static,
{
}

impl<E, Err, R> PersistenceAction<E, Err, R> {
    /// Save `element` through the adapter.
    pub fn save(element: E) -> Self {
        PersistenceAction::Persist(ProcessAction::Process(element))
    }

    /// Delete `element` through the adapter.
    pub fn delete(element: E) -> Self {
        PersistenceAction::Delete(ProcessAction::Process(element))
    }

    /// Observe `request`, replacing the current query.
    pub fn request(request: R) -> Self {
        PersistenceAction::Request(RequestAction::Request(request))
    }

    /// Cancel the current query.
    pub fn cancel_request() -> Self {
        PersistenceAction::Request(RequestAction::Cancel)
    }

    pub fn receive(request: R, result: FetchResult<E>) -> Self {
        PersistenceAction::Request(RequestAction::Receive { request, result })
    }

    pub fn fail_request(error: Err, request: R) -> Self {
        PersistenceAction::Request(RequestAction::Fail { error, request })
    }

    pub fn succeed_process(lane: ProcessLane) -> Self {
        Self::on_lane(lane, ProcessAction::Succeed)
    }

    pub fn fail_process(lane: ProcessLane, error: Err, element: E) -> Self {
        Self::on_lane(lane, ProcessAction::Fail { error, element })
    }

    fn on_lane(lane: ProcessLane, action: ProcessAction<E, Err>) -> Self {
        match lane {
            ProcessLane::Persist => PersistenceAction::Persist(action),
            ProcessLane::Delete => PersistenceAction::Delete(action),
        }
    }

    /// The element to hand to the adapter; only `Process` actions carry one.
    pub fn element_to_process(&self) -> Option<&E> {
        match self {
            PersistenceAction::Persist(ProcessAction::Process(element))
            | PersistenceAction::Delete(ProcessAction::Process(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_persist_action(&self) -> bool {
        matches!(self, PersistenceAction::Persist(_))
    }

    /// The process lane this action targets, `None` for query actions.
    pub fn process_lane(&self) -> Option<ProcessLane> {
        match self {
            PersistenceAction::Persist(_) => Some(ProcessLane::Persist),
            PersistenceAction::Delete(_) => Some(ProcessLane::Delete),
            PersistenceAction::Request(_) => None,
        }
    }
}
