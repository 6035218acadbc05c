//! Adapter assembled from one closure per operation.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use crate::persistence::{DiffError, FetchResult};

use super::{FetchStream, StorageAdapter};

type ProcessFn<E, Err> = Arc<dyn Fn(E) -> BoxFuture<'static, Result<(), Err>> + Send + Sync>;
type ObserveFn<E, R, Err> = Arc<dyn Fn(R) -> FetchStream<E, Err> + Send + Sync>;

/// A [`StorageAdapter`] whose save, delete and observe are independent closures.
///
/// Unset operations succeed without doing anything; an unset observe never
/// emits and never completes.
pub struct ClosureAdapter<E, R, Err> {
    save: ProcessFn<E, Err>,
    delete: ProcessFn<E, Err>,
    observe: ObserveFn<E, R, Err>,
}

impl<E, R, Err> ClosureAdapter<E, R, Err>
where
    E: Send + 'static,
    R: Send + 'static,
    Err: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            save: Arc::new(|_: E| async { Ok::<(), Err>(()) }.boxed()),
            delete: Arc::new(|_: E| async { Ok::<(), Err>(()) }.boxed()),
            observe: Arc::new(|_: R| stream::pending::<Result<FetchResult<E>, Err>>().boxed()),
        }
    }

    pub fn with_save<F, Fut>(mut self, save: F) -> Self
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Err>> + Send + 'static,
    {
        self.save = Arc::new(move |element| save(element).boxed());
        self
    }

    pub fn with_delete<F, Fut>(mut self, delete: F) -> Self
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Err>> + Send + 'static,
    {
        self.delete = Arc::new(move |element| delete(element).boxed());
        self
    }

    pub fn with_observe<F>(mut self, observe: F) -> Self
    where
        F: Fn(R) -> FetchStream<E, Err> + Send + Sync + 'static,
    {
        self.observe = Arc::new(observe);
        self
    }
}

impl<E, R, Err> Default for ClosureAdapter<E, R, Err>
where
    E: Send + 'static,
    R: Send + 'static,
    Err: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E, R, Err> StorageAdapter for ClosureAdapter<E, R, Err>
where
    E: Clone + PartialEq + Debug + Send + Sync + 'static,
    R: Clone + PartialEq + Debug + Send + Sync + 'static,
    Err: std::error::Error + Clone + PartialEq + From<DiffError> + Send + Sync + 'static,
{
    type Element = E;
    type Request = R;
    type Error = Err;

    async fn save(&self, element: &E) -> Result<(), Err> {
        (self.save)(element.clone()).await
    }

    async fn delete(&self, element: &E) -> Result<(), Err> {
        (self.delete)(element.clone()).await
    }

    fn observe(&self, request: &R) -> FetchStream<E, Err> {
        (self.observe)(request.clone())
    }
}
