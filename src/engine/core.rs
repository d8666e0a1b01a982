// src/engine/core.rs

//! Pure run state machine.
//!
//! Tracks `Pending → Running → {Completed, Aborted}` for every task of a
//! playbook and decides which task may run next. It performs no IO, so it
//! can be tested without Tokio, transports or a control plane.
//!
//! Rules:
//! - tasks run strictly in playbook order, one at a time;
//! - a task can only start once every earlier task is `Completed`;
//! - after the first `Aborted` no further task starts.

use crate::engine::{RunStatus, TaskState};
use crate::playbook::Playbook;

#[derive(Debug, Clone)]
pub struct RunState {
    names: Vec<String>,
    states: Vec<TaskState>,
}

impl RunState {
    pub fn new(playbook: &Playbook) -> Self {
        Self::from_names(playbook.tasks.iter().map(|t| t.name.clone()))
    }

    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        let names: Vec<String> = names.into_iter().collect();
        let states = vec![TaskState::Pending; names.len()];
        Self { names, states }
    }

    pub fn states(&self) -> &[TaskState] {
        &self.states
    }

    pub fn state_of(&self, idx: usize) -> Option<TaskState> {
        self.states.get(idx).copied()
    }

    pub fn name_of(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    /// Number of tasks that reached `Completed`.
    pub fn completed(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == TaskState::Completed)
            .count()
    }

    pub fn status(&self) -> RunStatus {
        if self.states.contains(&TaskState::Aborted) {
            RunStatus::Aborted
        } else if self.states.iter().all(|s| *s == TaskState::Completed) {
            RunStatus::Completed
        } else {
            RunStatus::Running
        }
    }

    /// Index of the next task allowed to start, if any.
    ///
    /// `None` while a task is running, after an abort, or when every task
    /// has completed.
    pub fn next_ready(&self) -> Option<usize> {
        if self.status() != RunStatus::Running || self.states.contains(&TaskState::Running) {
            return None;
        }
        self.states.iter().position(|s| *s == TaskState::Pending)
    }

    /// `Pending → Running`. Returns `false` if `idx` is not the next ready
    /// task.
    pub fn start(&mut self, idx: usize) -> bool {
        if self.next_ready() != Some(idx) {
            return false;
        }
        self.states[idx] = TaskState::Running;
        true
    }

    /// `Running → Completed`.
    pub fn complete(&mut self, idx: usize) -> bool {
        self.finish(idx, TaskState::Completed)
    }

    /// `Running → Aborted`. Halts the run.
    pub fn abort(&mut self, idx: usize) -> bool {
        self.finish(idx, TaskState::Aborted)
    }

    fn finish(&mut self, idx: usize, to: TaskState) -> bool {
        match self.states.get_mut(idx) {
            Some(state) if *state == TaskState::Running => {
                *state = to;
                true
            }
            _ => false,
        }
    }
}
