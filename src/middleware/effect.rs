//! Translation table from actions to effect descriptions.

use crate::persistence::{PersistenceAction, ProcessLane, RequestAction};

/// What the middleware must do for one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<E, R> {
    /// Untracked one-shot call to `save` or `delete`.
    Process { lane: ProcessLane, element: E },

    /// Tracked observation of `R`, replacing the current subscription.
    Subscribe(R),

    /// Cancel the current subscription.
    Cancel,

    /// Result actions are only folded by the reducer.
    None,
}

impl<E: Clone, R: Clone> Effect<E, R> {
    /// Inspects the action only; never looks at state.
    ///
    /// Process effects follow the action's own predicates, so an action
    /// launches an adapter call exactly when it has an element to process.
    pub fn from_action<Err>(action: &PersistenceAction<E, Err, R>) -> Self {
        if let Some(element) = action.element_to_process() {
            let lane = if action.is_persist_action() {
                ProcessLane::Persist
            } else {
                ProcessLane::Delete
            };
            return Effect::Process {
                lane,
                element: element.clone(),
            };
        }

        match action {
            PersistenceAction::Request(RequestAction::Request(request)) => {
                Effect::Subscribe(request.clone())
            }
            PersistenceAction::Request(RequestAction::Cancel) => Effect::Cancel,
            _ => Effect::None,
        }
    }
}
