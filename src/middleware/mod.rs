//! Effect middleware between dispatch and the reducer.
//!
//! The middleware inspects each action, never the state, and launches the
//! matching [`Effect`]:
//! - `Process` runs `save`/`delete` as an untracked task and dispatches
//!   `Succeed` or `Fail` for the same lane
//! - `Subscribe` replaces the current [`SubscriptionHandle`] and forwards
//!   every adapter emission as `Receive`, a terminal error as `Fail`
//! - `Cancel` drops the current handle

mod effect;
mod subscription;

use std::sync::Arc;

use futures::StreamExt;

use crate::adapter::{AdapterAction, StorageAdapter};
use crate::persistence::{PersistenceAction, ProcessLane};
use crate::store::{Dispatcher, Origin};

pub use effect::Effect;
pub use subscription::{SubscriptionHandle, SubscriptionId};

/// Runs adapter effects for a single store.
pub struct PersistenceMiddleware<A: StorageAdapter> {
    adapter: Arc<A>,
    subscription: Option<SubscriptionHandle>,
    next_id: SubscriptionId,
}

impl<A: StorageAdapter> PersistenceMiddleware<A> {
    pub fn new(adapter: Arc<A>) -> Self {
        Self {
            adapter,
            subscription: None,
            next_id: 0,
        }
    }

    /// Id of the live query subscription, if any.
    pub fn current_subscription(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(SubscriptionHandle::id)
    }

    /// Whether an action from `origin` may still be folded.
    ///
    /// Actions from a superseded or canceled subscription are rejected.
    pub fn accepts(&self, origin: Origin) -> bool {
        match origin {
            Origin::Subscription(id) => self.current_subscription() == Some(id),
            Origin::External | Origin::Process => true,
        }
    }

    /// Launch the effect for `action`. Must be called from a tokio runtime.
    pub fn handle(&mut self, action: &AdapterAction<A>, dispatcher: &Dispatcher<AdapterAction<A>>) {
        match Effect::from_action(action) {
            Effect::Process { lane, element } => self.spawn_process(lane, element, dispatcher),
            Effect::Subscribe(request) => self.subscribe(request, dispatcher),
            Effect::Cancel => self.cancel(),
            Effect::None => {}
        }
    }

    /// Drop the live subscription, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.subscription.take() {
            tracing::debug!(subscription = handle.id(), "Canceling query subscription");
        }
    }

    fn spawn_process(
        &self,
        lane: ProcessLane,
        element: A::Element,
        dispatcher: &Dispatcher<AdapterAction<A>>,
    ) {
        let adapter = Arc::clone(&self.adapter);
        let dispatcher = dispatcher.with_origin(Origin::Process);

        tokio::spawn(async move {
            let result = match lane {
                ProcessLane::Persist => adapter.save(&element).await,
                ProcessLane::Delete => adapter.delete(&element).await,
            };
            let action = match result {
                Ok(()) => {
                    tracing::trace!(?lane, "Process effect succeeded");
                    PersistenceAction::succeed_process(lane)
                }
                Err(error) => {
                    tracing::warn!(?lane, error = %error, "Process effect failed");
                    PersistenceAction::fail_process(lane, error, element)
                }
            };
            if dispatcher.dispatch(action).is_err() {
                tracing::trace!(?lane, "Store closed before the process result arrived");
            }
        });
    }

    fn subscribe(&mut self, request: A::Request, dispatcher: &Dispatcher<AdapterAction<A>>) {
        // The old subscription goes away before the new one exists.
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let mut stream = self.adapter.observe(&request);
        let dispatcher = dispatcher.with_origin(Origin::Subscription(id));
        tracing::debug!(subscription = id, ?request, "Starting query subscription");

        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                let action = match item {
                    Ok(result) => PersistenceAction::receive(request.clone(), result),
                    Err(error) => {
                        tracing::warn!(subscription = id, error = %error, "Query subscription failed");
                        let failure = PersistenceAction::fail_request(error, request);
                        if dispatcher.dispatch(failure).is_err() {
                            tracing::trace!(subscription = id, "Store closed, dropping query failure");
                        }
                        return;
                    }
                };
                if dispatcher.dispatch(action).is_err() {
                    tracing::trace!(subscription = id, "Store closed, dropping query result");
                    return;
                }
            }
            tracing::debug!(subscription = id, "Query subscription completed");
        });

        self.subscription = Some(SubscriptionHandle::new(id, task.abort_handle()));
    }
}
