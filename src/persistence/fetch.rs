//! Query emissions and their reconciliation into an element list.

use super::diff::{Diff, DiffError};

/// Payload emitted by an observed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult<E> {
    /// Full, ordered result of the query.
    Snapshot(Vec<E>),
    /// Ordered changes relative to the previously emitted list.
    Diff(Diff<E>),
}

impl<E> FetchResult<E> {
    pub fn is_snapshot(&self) -> bool {
        matches!(self, FetchResult::Snapshot(_))
    }
}

/// Merge a fetch result into the currently materialized list.
///
/// `current` is `None` when no list has been received yet. A snapshot always
/// replaces whatever is there. A diff is applied to `current` when present;
/// without a base list only its insertions are kept, in offset order. That
/// fallback drops removal information and can diverge from the backend's
/// real ordering.
pub fn reconcile<E: Clone + PartialEq>(
    current: Option<&[E]>,
    result: FetchResult<E>,
) -> Result<Vec<E>, DiffError> {
    match (result, current) {
        (FetchResult::Snapshot(elements), _) => Ok(elements),
        (FetchResult::Diff(diff), Some(base)) => diff.apply(base),
        (FetchResult::Diff(diff), None) => Ok(diff.inserted_elements()),
    }
}
