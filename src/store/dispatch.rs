//! Origin-tagged action delivery into the store loop.

use tokio::sync::mpsc;

use crate::middleware::SubscriptionId;

use super::StoreError;

/// Where an action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Dispatched by the application.
    External,
    /// Result of an untracked save/delete effect.
    Process,
    /// Emitted by a query subscription.
    Subscription(SubscriptionId),
}

/// An action on its way to the store loop.
#[derive(Debug)]
pub struct Envelope<Act> {
    pub origin: Origin,
    pub action: Act,
}

/// Cloneable handle for sending actions to a running store.
pub struct Dispatcher<Act> {
    tx: mpsc::UnboundedSender<Envelope<Act>>,
    origin: Origin,
}

impl<Act> Clone for Dispatcher<Act> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            origin: self.origin,
        }
    }
}

impl<Act> Dispatcher<Act> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Envelope<Act>>) -> Self {
        Self {
            tx,
            origin: Origin::External,
        }
    }

    /// Same channel, different origin tag.
    pub(crate) fn with_origin(&self, origin: Origin) -> Self {
        Self {
            tx: self.tx.clone(),
            origin,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Queue `action` for folding.
    ///
    /// # Errors
    /// Returns [`StoreError::Closed`] once the store loop has stopped.
    pub fn dispatch(&self, action: Act) -> Result<(), StoreError> {
        self.tx
            .send(Envelope {
                origin: self.origin,
                action,
            })
            .map_err(|_| StoreError::Closed)
    }
}
