//! Error taxonomy carried in failed lanes.

use thiserror::Error;

use super::diff::DiffError;

/// Errors that can end up in a `Failed` lane.
///
/// Adapters may bring their own error type instead; it only has to accept
/// [`DiffError`] so the reducer can report merge failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The backend could not be initialized or reached.
    #[error("Storage adapter unavailable: {reason}")]
    AdapterUnavailable { reason: String },

    /// A save or delete was rejected by the backend.
    #[error("Operation failed: {reason}")]
    OperationFailed { reason: String },

    /// The observed query stream failed.
    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    /// A diff could not be merged into the current list.
    #[error("Diff incompatible with current list: {0}")]
    DiffIncompatible(#[from] DiffError),

    /// A stored record could not be converted to or from an element.
    #[error("Failed to map record '{key}': {reason}")]
    MappingFailed { key: String, reason: String },
}

impl PersistenceError {
    /// Stable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PersistenceError::AdapterUnavailable { .. } => "adapter_unavailable",
            PersistenceError::OperationFailed { .. } => "operation_failed",
            PersistenceError::QueryFailed { .. } => "query_failed",
            PersistenceError::DiffIncompatible(_) => "diff_incompatible",
            PersistenceError::MappingFailed { .. } => "mapping_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_error_converts_to_diff_incompatible() {
        let err: PersistenceError = DiffError::ElementMismatch { offset: 2 }.into();
        assert_eq!(err.kind(), "diff_incompatible");
        assert!(err.to_string().contains("offset 2"));
    }

    #[test]
    fn mapping_failed_names_the_record() {
        let err = PersistenceError::MappingFailed {
            key: "song-1".to_string(),
            reason: "missing field `title`".to_string(),
        };
        assert_eq!(err.kind(), "mapping_failed");
        assert_eq!(
            err.to_string(),
            "Failed to map record 'song-1': missing field `title`"
        );
    }
}
