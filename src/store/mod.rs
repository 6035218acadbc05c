//! The store: single serialization point for persistence actions.
//!
//! Every action, whether dispatched by the application or produced by an
//! effect, goes through one loop that runs the middleware and folds the
//! reducer one action at a time in arrival order. Every changed state is
//! delivered to every subscriber in fold order; each subscriber has its own
//! unbounded channel, so a slow reader falls behind but never skips a state.

mod dispatch;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::adapter::{AdapterAction, AdapterState, StorageAdapter};
use crate::middleware::PersistenceMiddleware;
use crate::mvi::Reducer;
use crate::persistence::PersistenceReducer;

pub use dispatch::{Dispatcher, Envelope, Origin};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store loop is no longer running")]
    Closed,
}

type Subscribers<S> = Arc<Mutex<Vec<mpsc::UnboundedSender<S>>>>;

type AdapterReducer<A> = PersistenceReducer<
    <A as StorageAdapter>::Element,
    <A as StorageAdapter>::Error,
    <A as StorageAdapter>::Request,
>;

/// Handle to a running persistence store.
///
/// Dropping the store stops its loop and cancels the live query
/// subscription; in-flight save/delete effects still run to completion.
pub struct Store<A: StorageAdapter> {
    dispatcher: Dispatcher<AdapterAction<A>>,
    state: Arc<RwLock<AdapterState<A>>>,
    subscribers: Subscribers<AdapterState<A>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<A: StorageAdapter> Store<A> {
    /// Start the store loop on the current tokio runtime.
    pub fn spawn(adapter: A) -> Self {
        let (tx, inbox) = mpsc::unbounded_channel();
        let subscribers: Subscribers<AdapterState<A>> = Arc::default();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let dispatcher = Dispatcher::new(tx);
        let state = Arc::new(RwLock::new(AdapterState::<A>::initial()));

        let task = tokio::spawn(run_loop(
            PersistenceMiddleware::new(Arc::new(adapter)),
            dispatcher.clone(),
            inbox,
            Arc::clone(&state),
            Arc::clone(&subscribers),
            shutdown_rx,
        ));

        Self {
            dispatcher,
            state,
            subscribers,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Queue `action`.
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the loop has stopped.
    pub fn dispatch(&self, action: AdapterAction<A>) -> Result<(), StoreError> {
        self.dispatcher.dispatch(action)
    }

    /// A dispatcher that outlives borrows of the store.
    pub fn dispatcher(&self) -> Dispatcher<AdapterAction<A>> {
        self.dispatcher.clone()
    }

    /// Latest folded state.
    pub fn state(&self) -> AdapterState<A> {
        self.state.read().clone()
    }

    /// Receive every state change from now on, in fold order.
    ///
    /// The channel closes when the store loop stops. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AdapterState<A>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Stop the loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "Store loop ended abnormally");
            }
        }
    }
}

impl<A: StorageAdapter> Drop for Store<A> {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run_loop<A: StorageAdapter>(
    mut middleware: PersistenceMiddleware<A>,
    dispatcher: Dispatcher<AdapterAction<A>>,
    mut inbox: mpsc::UnboundedReceiver<Envelope<AdapterAction<A>>>,
    shared: Arc<RwLock<AdapterState<A>>>,
    subscribers: Subscribers<AdapterState<A>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    tracing::debug!("Store loop started");
    let mut current = shared.read().clone();

    loop {
        let envelope = tokio::select! {
            _ = &mut shutdown => break,
            envelope = inbox.recv() => match envelope {
                Some(envelope) => envelope,
                None => break,
            },
        };

        if !middleware.accepts(envelope.origin) {
            tracing::trace!(origin = ?envelope.origin, "Dropping action from stale subscription");
            continue;
        }

        middleware.handle(&envelope.action, &dispatcher);

        let next = AdapterReducer::<A>::reduce(current.clone(), envelope.action);
        if next == current {
            continue;
        }
        current = next;
        *shared.write() = current.clone();
        subscribers
            .lock()
            .retain(|subscriber| subscriber.send(current.clone()).is_ok());
    }

    middleware.cancel();
    subscribers.lock().clear();
    tracing::debug!("Store loop stopped");
}
