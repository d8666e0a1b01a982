// tests/run_state.rs

use ambari_playbook::engine::{RunState, RunStatus, TaskState};

fn three() -> RunState {
    RunState::from_names(["a", "b", "c"].map(String::from))
}

#[test]
fn tasks_start_strictly_in_order() {
    let mut state = three();

    assert_eq!(state.next_ready(), Some(0));
    assert!(!state.start(1), "cannot skip ahead");
    assert!(state.start(0));
    assert_eq!(state.next_ready(), None, "one task at a time");
    assert!(!state.start(1));

    assert!(state.complete(0));
    assert_eq!(state.next_ready(), Some(1));
    assert_eq!(state.status(), RunStatus::Running);
}

#[test]
fn full_run_completes() {
    let mut state = three();
    for idx in 0..3 {
        assert!(state.start(idx));
        assert!(state.complete(idx));
    }

    assert_eq!(state.status(), RunStatus::Completed);
    assert_eq!(state.completed(), 3);
    assert_eq!(state.next_ready(), None);
}

#[test]
fn abort_halts_the_run() {
    let mut state = three();
    state.start(0);
    state.complete(0);
    state.start(1);

    assert!(state.abort(1));

    assert_eq!(state.status(), RunStatus::Aborted);
    assert_eq!(state.next_ready(), None);
    assert!(!state.start(2));
    assert_eq!(
        state.states(),
        &[TaskState::Completed, TaskState::Aborted, TaskState::Pending]
    );
    assert_eq!(state.completed(), 1);
    assert_eq!(state.name_of(1), Some("b"));
}

#[test]
fn only_running_tasks_can_finish() {
    let mut state = three();

    assert!(!state.complete(0));
    assert!(!state.abort(0));
    assert!(!state.complete(7));
    assert_eq!(state.state_of(0), Some(TaskState::Pending));
    assert_eq!(state.state_of(7), None);

    state.start(0);
    state.complete(0);
    assert!(!state.abort(0), "completed tasks stay completed");
}
