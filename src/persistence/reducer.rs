//! Reducers for the three persistence lanes.
//!
//! Each lane has its own reducer; [`PersistenceReducer`] routes an action to
//! exactly one of them, so lanes never observe each other's actions.

use std::marker::PhantomData;

use crate::mvi::Reducer;

use super::action::{PersistenceAction, ProcessAction, RequestAction};
use super::diff::DiffError;
use super::fetch::reconcile;
use super::state::{PersistenceState, ProcessState, RequestState};

/// Reducer shared by the persist and delete lanes.
pub struct ProcessReducer<E, Err>(PhantomData<fn() -> (E, Err)>);

impl<E, Err> Reducer for ProcessReducer<E, Err>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static,
{
    type State = ProcessState<E, Err>;
    type Action = ProcessAction<E, Err>;

    fn reduce(_state: Self::State, action: Self::Action) -> Self::State {
        match action {
            ProcessAction::Process(_) => ProcessState::Processing,
            ProcessAction::Succeed => ProcessState::Succeeded,
            ProcessAction::Fail { error, element } => ProcessState::Failed { error, element },
        }
    }
}

/// Reducer for the query lane.
pub struct RequestReducer<E, Err, R>(PhantomData<fn() -> (E, Err, R)>);

impl<E, Err, R> Reducer for RequestReducer<E, Err, R>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static + From<DiffError>,
    R: Clone + PartialEq + Send + 'static,
{
    type State = RequestState<E, Err, R>;
    type Action = RequestAction<E, Err, R>;

    fn reduce(state: Self::State, action: Self::Action) -> Self::State {
        match action {
            // A fresh request never keeps the previous list.
            RequestAction::Request(_) => RequestState::Loading,

            RequestAction::Cancel => RequestState::Canceled,

            RequestAction::Fail { error, request } => RequestState::Failed { error, request },

            RequestAction::Receive { request, result } => {
                match reconcile(state.elements(), result) {
                    Ok(elements) => RequestState::Received(elements),
                    Err(err) => RequestState::Failed {
                        error: err.into(),
                        request,
                    },
                }
            }
        }
    }
}

/// Whole-store reducer composed from the three lane reducers.
pub struct PersistenceReducer<E, Err, R>(PhantomData<fn() -> (E, Err, R)>);

impl<E, Err, R> Reducer for PersistenceReducer<E, Err, R>
where
    E: Clone + PartialEq + Send + 'static,
    Err: Clone + PartialEq + Send + 'static + From<DiffError>,
    R: Clone + PartialEq + Send + 'static,
{
    type State = PersistenceState<E, Err, R>;
    type Action = PersistenceAction<E, Err, R>;

    fn reduce(mut state: Self::State, action: Self::Action) -> Self::State {
        match action {
            PersistenceAction::Request(action) => {
                state.request = RequestReducer::<E, Err, R>::reduce(state.request, action);
            }
            PersistenceAction::Persist(action) => {
                state.persist = ProcessReducer::<E, Err>::reduce(state.persist, action);
            }
            PersistenceAction::Delete(action) => {
                state.delete = ProcessReducer::<E, Err>::reduce(state.delete, action);
            }
        }
        state
    }
}
