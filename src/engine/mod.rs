// src/engine/mod.rs

//! Playbook execution engine.
//!
//! The pure per-task state machine lives in [`core`]; the async shell that
//! resolves hosts and calls the executors is [`runner`].

use crate::exec::LocalOutput;
use crate::types::{LifecycleScope, RemoteResults, TaskKind};

/// Per-task state within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not started yet.
    Pending,
    /// Currently dispatched to an executor.
    Running,
    /// Finished successfully; its side effects stay applied.
    Completed,
    /// Failed; the run halts here.
    Aborted,
}

/// Overall state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

/// What a completed task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    /// One result per targeted host (remote command or upload).
    Remote(RemoteResults),
    Local(LocalOutput),
    Downloaded { bytes: u64 },
    /// Control-plane lifecycle command, and which path it took.
    Lifecycle(LifecycleScope),
    ConfigUpdated,
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub name: String,
    pub kind: TaskKind,
    pub output: TaskOutput,
}

/// Summary of a fully completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub playbook: String,
    pub tasks: Vec<TaskReport>,
}

pub mod core;
pub mod runner;

pub use self::core::RunState;
pub use runner::PlaybookRunner;
