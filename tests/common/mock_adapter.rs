//! Scriptable storage adapter for driving the store from tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use parking_lot::Mutex;

use persistence_middleware::{FetchResult, FetchStream, PersistenceError, StorageAdapter};

pub type Element = &'static str;
pub type Request = &'static str;
pub type Emission = Result<FetchResult<Element>, PersistenceError>;

struct Subscription {
    request: Request,
    tx: mpsc::UnboundedSender<Emission>,
}

#[derive(Default)]
struct Inner {
    subscriptions: Mutex<Vec<Subscription>>,
    save_error: Mutex<Option<PersistenceError>>,
    delete_error: Mutex<Option<PersistenceError>>,
    saved: Mutex<Vec<Element>>,
    deleted: Mutex<Vec<Element>>,
}

/// Adapter whose query streams are fed by the test.
///
/// Every `observe` call opens a new channel; [`emit`](Self::emit) pushes into
/// the live channels for a request. Save and delete succeed unless a failure
/// has been scripted.
#[derive(Clone, Default)]
pub struct MockAdapter {
    inner: Arc<Inner>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save fail with `error`.
    pub fn fail_saves(&self, error: PersistenceError) {
        *self.inner.save_error.lock() = Some(error);
    }

    /// Make every following delete fail with `error`.
    pub fn fail_deletes(&self, error: PersistenceError) {
        *self.inner.delete_error.lock() = Some(error);
    }

    pub fn saved(&self) -> Vec<Element> {
        self.inner.saved.lock().clone()
    }

    pub fn deleted(&self) -> Vec<Element> {
        self.inner.deleted.lock().clone()
    }

    /// Push `emission` to every live subscription for `request`.
    ///
    /// Returns `false` when no live subscription received it.
    pub fn emit(&self, request: Request, emission: Emission) -> bool {
        let subscriptions = self.inner.subscriptions.lock();
        let mut delivered = false;
        for subscription in subscriptions.iter().filter(|s| s.request == request) {
            if subscription.tx.unbounded_send(emission.clone()).is_ok() {
                delivered = true;
            }
        }
        delivered
    }

    /// Subscriptions for `request` whose stream has not been dropped.
    pub fn live_subscriptions(&self, request: Request) -> usize {
        self.inner
            .subscriptions
            .lock()
            .iter()
            .filter(|s| s.request == request && !s.tx.is_closed())
            .count()
    }

    /// Wait until exactly `count` subscriptions for `request` are live.
    pub async fn wait_for_subscriptions(&self, request: Request, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.live_subscriptions(request) != count {
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "expected {} live subscription(s) for {:?}, found {}",
                    count,
                    request,
                    self.live_subscriptions(request)
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl StorageAdapter for MockAdapter {
    type Element = Element;
    type Request = Request;
    type Error = PersistenceError;

    async fn save(&self, element: &Element) -> Result<(), PersistenceError> {
        if let Some(error) = self.inner.save_error.lock().clone() {
            return Err(error);
        }
        self.inner.saved.lock().push(*element);
        Ok(())
    }

    async fn delete(&self, element: &Element) -> Result<(), PersistenceError> {
        if let Some(error) = self.inner.delete_error.lock().clone() {
            return Err(error);
        }
        self.inner.deleted.lock().push(*element);
        Ok(())
    }

    fn observe(&self, request: &Request) -> FetchStream<Element, PersistenceError> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.subscriptions.lock().push(Subscription {
            request: *request,
            tx,
        });
        rx.boxed()
    }
}
