//! Base trait for actions in MVI architecture.

/// Marker trait for action objects.
///
/// Actions represent:
/// - Caller intents (save this, run that query)
/// - Effect completions (backend responses, stream emissions)
///
/// Actions are processed by reducers to produce new states.
pub trait Action: Send + 'static {}
