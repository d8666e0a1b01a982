// src/engine/runner.rs

//! Async side of the engine.
//!
//! [`PlaybookRunner`] drives a [`RunState`] over a validated playbook:
//! resolve each task's hosts, dispatch it to the remote, local or
//! control-plane executor, and stop at the first failure.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use crate::config::RegistryConfig;
use crate::control_plane::{ControlPlane, ControlPlaneAdapter};
use crate::engine::core::RunState;
use crate::engine::{RunReport, RunStatus, TaskOutput, TaskReport};
use crate::errors::{PlaybookError, Result};
use crate::exec::{LocalBackend, LocalExecutor, RemoteExecutor, RemoteTransport};
use crate::filter::HostFilter;
use crate::playbook::{Playbook, Task, TaskAction};
use crate::topology::Topology;
use crate::types::HostSet;

/// Walks a playbook task by task, resolving targets and dispatching each
/// task to its executor.
///
/// All collaborators are passed in at construction; the runner reads no
/// global state. The first failing task aborts the run and is reported as
/// [`PlaybookError::TaskFailed`]; tasks that already completed stay applied.
pub struct PlaybookRunner {
    topology: Arc<dyn Topology>,
    remote: RemoteExecutor,
    local: LocalExecutor,
    control_plane: ControlPlaneAdapter,
}

impl fmt::Debug for PlaybookRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybookRunner")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl PlaybookRunner {
    pub fn new(
        config: &RegistryConfig,
        topology: Arc<dyn Topology>,
        transport: Arc<dyn RemoteTransport>,
        local: Arc<dyn LocalBackend>,
        control_plane: Arc<dyn ControlPlane>,
    ) -> Self {
        Self {
            topology,
            remote: RemoteExecutor::new(transport, config),
            local: LocalExecutor::new(local),
            control_plane: ControlPlaneAdapter::new(control_plane),
        }
    }

    /// Run every task of `playbook` in order.
    pub async fn execute(&self, playbook: &Playbook) -> Result<RunReport> {
        let mut state = RunState::new(playbook);
        self.execute_tracked(playbook, &mut state).await
    }

    /// Same as [`execute`](Self::execute), recording per-task states in
    /// `state` so callers can inspect where a run stopped.
    pub async fn execute_tracked(
        &self,
        playbook: &Playbook,
        state: &mut RunState,
    ) -> Result<RunReport> {
        info!(playbook = %playbook.name, tasks = playbook.tasks.len(), "executing playbook");

        let mut reports = Vec::with_capacity(playbook.tasks.len());

        while let Some(idx) = state.next_ready() {
            let task = &playbook.tasks[idx];
            state.start(idx);

            let span = info_span!("task", task = %task.name, kind = %task.kind());
            let outcome = self.execute_task(task).instrument(span).await;

            match outcome {
                Ok(output) => {
                    state.complete(idx);
                    debug!(task = %task.name, "task completed");
                    reports.push(TaskReport {
                        name: task.name.clone(),
                        kind: task.kind(),
                        output,
                    });
                }
                Err(err) => {
                    state.abort(idx);
                    error!(task = %task.name, error = %err, "task failed; aborting playbook");
                    return Err(PlaybookError::TaskFailed {
                        task: task.name.clone(),
                        completed: state.completed(),
                        source: Box::new(err),
                    });
                }
            }
        }

        debug_assert_eq!(state.status(), RunStatus::Completed);
        info!(playbook = %playbook.name, "playbook finished");

        Ok(RunReport {
            playbook: playbook.name.clone(),
            tasks: reports,
        })
    }

    /// Resolve the task's hosts (unless agent-only) and dispatch it.
    async fn execute_task(&self, task: &Task) -> Result<TaskOutput> {
        let targeted = if task.targeting.agent_only {
            None
        } else {
            let filter = HostFilter::from_targeting(&task.targeting);
            Some(filter.resolve(self.topology.as_ref()).await?)
        };

        let control_plane = task.targeting.control_plane;

        match &task.action {
            TaskAction::RemoteCommand { command } => {
                let hosts = self.hosts_for_fan_out(targeted).await?;
                let results = self.remote.run_remote(command, &hosts, control_plane).await?;
                Ok(TaskOutput::Remote(results))
            }
            TaskAction::Upload { source, target } => {
                let hosts = self.hosts_for_fan_out(targeted).await?;
                let results = self
                    .remote
                    .upload(source, target, &hosts, control_plane)
                    .await?;
                Ok(TaskOutput::Remote(results))
            }
            TaskAction::LocalCommand { command } => {
                let output = self.local.run_local(command).await?;
                Ok(TaskOutput::Local(output))
            }
            TaskAction::Download { url, file } => {
                let bytes = self.local.download_file(url, file).await?;
                Ok(TaskOutput::Downloaded { bytes })
            }
            TaskAction::Config {
                config_type,
                config_key,
                config_value,
            } => {
                self.control_plane
                    .set_config(config_type, config_key, config_value)
                    .await?;
                Ok(TaskOutput::ConfigUpdated)
            }
            TaskAction::AmbariCommand { command } => {
                let scope = self
                    .control_plane
                    .run_lifecycle(command, &task.targeting)
                    .await?;
                Ok(TaskOutput::Lifecycle(scope))
            }
        }
    }

    /// Agent-only remote tasks bypass filtering and target every host.
    async fn hosts_for_fan_out(&self, targeted: Option<HostSet>) -> Result<HostSet> {
        match targeted {
            Some(hosts) => Ok(hosts),
            None => self.topology.list_all_hosts().await,
        }
    }
}
