//! Owned handle to the live query subscription.

use tokio::task::AbortHandle;

/// Identifies one subscription for the lifetime of a store.
pub type SubscriptionId = u64;

/// The current query subscription.
///
/// Dropping the handle aborts the task draining the adapter stream, which in
/// turn drops the stream and tears the backend subscription down.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    abort: AbortHandle,
}

impl SubscriptionHandle {
    pub fn new(id: SubscriptionId, abort: AbortHandle) -> Self {
        Self { id, abort }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn dropping_the_handle_aborts_the_task() {
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let handle = SubscriptionHandle::new(7, task.abort_handle());
        assert_eq!(handle.id(), 7);

        drop(handle);
        let joined = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("task should finish once aborted");
        assert!(joined.unwrap_err().is_cancelled());
    }
}
