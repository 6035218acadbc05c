mod common;

use persistence_middleware::mvi::Reducer;
use persistence_middleware::persistence::{PersistenceReducer, ProcessLane};
use persistence_middleware::{
    Change, Diff, FetchResult, PersistenceAction, PersistenceError, PersistenceState,
    ProcessState, RequestState,
};

type State = PersistenceState<&'static str, PersistenceError, &'static str>;
type Action = PersistenceAction<&'static str, PersistenceError, &'static str>;
type Subject = PersistenceReducer<&'static str, PersistenceError, &'static str>;

fn failure(reason: &str) -> PersistenceError {
    PersistenceError::OperationFailed {
        reason: reason.to_string(),
    }
}

/// A spread of reachable states across all three lanes.
fn reachable_states() -> Vec<State> {
    let mut states = vec![State::initial()];
    let query_steps = [
        Action::request("all"),
        Action::receive("all", FetchResult::Snapshot(vec!["A", "B"])),
        Action::fail_request(failure("gone"), "all"),
        Action::cancel_request(),
    ];
    let process_steps = [
        Action::save("A"),
        Action::succeed_process(ProcessLane::Persist),
        Action::delete("B"),
        Action::fail_process(ProcessLane::Delete, failure("locked"), "B"),
    ];
    for query in &query_steps {
        for process in &process_steps {
            let state = Subject::reduce(State::initial(), query.clone());
            states.push(Subject::reduce(state, process.clone()));
        }
    }
    states
}

fn process_actions() -> Vec<Action> {
    vec![
        Action::save("X"),
        Action::delete("Y"),
        Action::succeed_process(ProcessLane::Persist),
        Action::succeed_process(ProcessLane::Delete),
        Action::fail_process(ProcessLane::Persist, failure("full"), "X"),
        Action::fail_process(ProcessLane::Delete, failure("full"), "Y"),
    ]
}

fn query_actions() -> Vec<Action> {
    vec![
        Action::request("recent"),
        Action::cancel_request(),
        Action::receive("recent", FetchResult::Snapshot(vec!["Z"])),
        Action::receive(
            "recent",
            FetchResult::Diff(Diff::new(vec![Change::insert(0, "Q")]).unwrap()),
        ),
        Action::fail_request(failure("timeout"), "recent"),
    ]
}

#[test]
fn process_actions_never_touch_the_query_lane() {
    for state in reachable_states() {
        for action in process_actions() {
            let next = Subject::reduce(state.clone(), action);
            assert_eq!(next.request, state.request);
        }
    }
}

#[test]
fn query_actions_never_touch_the_process_lanes() {
    for state in reachable_states() {
        for action in query_actions() {
            let next = Subject::reduce(state.clone(), action);
            assert_eq!(next.persist, state.persist);
            assert_eq!(next.delete, state.delete);
        }
    }
}

#[test]
fn persist_and_delete_lanes_are_independent() {
    let state = Subject::reduce(State::initial(), Action::save("A"));
    let state = Subject::reduce(state, Action::fail_process(ProcessLane::Delete, failure("x"), "B"));
    assert_eq!(state.persist, ProcessState::Processing);
    assert_eq!(
        state.delete,
        ProcessState::Failed {
            error: failure("x"),
            element: "B"
        }
    );
}

#[test]
fn process_from_terminal_state_resets_to_processing() {
    let succeeded = Subject::reduce(State::initial(), Action::succeed_process(ProcessLane::Persist));
    assert_eq!(succeeded.persist, ProcessState::Succeeded);
    assert_eq!(Subject::reduce(succeeded, Action::save("A")).persist, ProcessState::Processing);

    let failed = Subject::reduce(
        State::initial(),
        Action::fail_process(ProcessLane::Delete, failure("busy"), "A"),
    );
    assert_eq!(Subject::reduce(failed, Action::delete("A")).delete, ProcessState::Processing);
}

#[test]
fn fresh_request_discards_the_received_list() {
    let state = Subject::reduce(
        State::initial(),
        Action::receive("all", FetchResult::Snapshot(vec!["A"])),
    );
    let state = Subject::reduce(state, Action::request("other"));
    assert_eq!(state.request, RequestState::Loading);
    assert!(state.request.elements().is_none());
}

#[test]
fn removal_and_insertion_apply_as_one_edit() {
    let state = Subject::reduce(
        State::initial(),
        Action::receive("all", FetchResult::Snapshot(vec!["A", "B", "C"])),
    );
    let diff = Diff::new(vec![Change::remove(0, "A"), Change::insert(2, "D")]).unwrap();
    let state = Subject::reduce(state, Action::receive("all", FetchResult::Diff(diff)));
    assert_eq!(state.request, RequestState::Received(vec!["B", "C", "D"]));
}

#[test]
fn diff_while_loading_materializes_insertions_only() {
    let loading = Subject::reduce(State::initial(), Action::request("all"));
    let diff = Diff::new(vec![
        Change::remove(0, "gone"),
        Change::insert(1, "B"),
        Change::insert(0, "A"),
    ])
    .unwrap();
    let state = Subject::reduce(loading, Action::receive("all", FetchResult::Diff(diff)));
    assert_eq!(state.request, RequestState::Received(vec!["A", "B"]));
}

#[test]
fn mismatched_removal_fails_without_partial_patch() {
    let state = Subject::reduce(
        State::initial(),
        Action::receive("all", FetchResult::Snapshot(vec!["A", "B"])),
    );
    let diff = Diff::new(vec![Change::remove(0, "A"), Change::remove(1, "Z")]).unwrap();
    let state = Subject::reduce(state, Action::receive("all", FetchResult::Diff(diff)));
    match state.request {
        RequestState::Failed { error, request } => {
            assert_eq!(error.kind(), "diff_incompatible");
            assert_eq!(request, "all");
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[test]
fn empty_diff_keeps_the_received_list() {
    let state = Subject::reduce(
        State::initial(),
        Action::receive("all", FetchResult::Snapshot(vec!["A"])),
    );
    let state = Subject::reduce(state, Action::receive("all", FetchResult::Diff(Diff::default())));
    assert_eq!(state.request, RequestState::Received(vec!["A"]));

    let canceled = Subject::reduce(State::initial(), Action::cancel_request());
    let state = Subject::reduce(canceled, Action::receive("all", FetchResult::Diff(Diff::default())));
    assert_eq!(state.request, RequestState::Received(vec![]));
}

#[test]
fn query_failure_keeps_the_request_for_retry() {
    let state = Subject::reduce(
        State::initial(),
        Action::fail_request(failure("offline"), "starred"),
    );
    assert_eq!(state.request.error(), Some(&failure("offline")));
    assert!(matches!(state.request, RequestState::Failed { request: "starred", .. }));
}
