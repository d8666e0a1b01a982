// src/exec/remote.rs

//! Concurrent fan-out of one remote operation over a host set.
//!
//! Every host gets its own Tokio task, all spawned before any is awaited.
//! Each task returns an owned `(host, outcome)` pair; the join loop folds
//! them into the result map, so the per-host units share no mutable state.
//! The call returns only after every unit has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::{ConnectionProfile, RegistryConfig};
use crate::errors::{PlaybookError, Result};
use crate::exec::backend::{RemoteTransport, SessionSpec};
use crate::types::{HostName, HostSet, RemoteResult, RemoteResults};

#[derive(Debug, Clone)]
enum RemoteOp {
    Run { command: String },
    Copy { source: PathBuf, target: String },
}

impl RemoteOp {
    async fn execute(
        self,
        transport: &dyn RemoteTransport,
        session: SessionSpec,
    ) -> Result<RemoteResult> {
        match self {
            RemoteOp::Run { command } => transport.run(session, command).await,
            RemoteOp::Copy { source, target } => transport.copy(session, source, target).await,
        }
    }
}

/// Runs commands and copies files on agent hosts.
pub struct RemoteExecutor {
    transport: Arc<dyn RemoteTransport>,
    registry_id: String,
    profile: Option<ConnectionProfile>,
    max_parallel_hosts: usize,
}

impl std::fmt::Debug for RemoteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteExecutor")
            .field("registry_id", &self.registry_id)
            .field("profile", &self.profile)
            .field("max_parallel_hosts", &self.max_parallel_hosts)
            .finish_non_exhaustive()
    }
}

impl RemoteExecutor {
    pub fn new(transport: Arc<dyn RemoteTransport>, config: &RegistryConfig) -> Self {
        Self {
            transport,
            registry_id: config.registry.id.clone(),
            profile: config.connection_profile.clone(),
            max_parallel_hosts: config.engine.max_parallel_hosts.max(1),
        }
    }

    /// Run `command` on every host in `hosts`.
    ///
    /// On success the map has exactly one entry per host. If any host fails
    /// at the transport level the whole call fails with
    /// [`PlaybookError::Transport`], after all other hosts have finished.
    pub async fn run_remote(
        &self,
        command: &str,
        hosts: &HostSet,
        control_plane: bool,
    ) -> Result<RemoteResults> {
        info!(command = %command, hosts = hosts.len(), control_plane, "execute remote command");
        let op = RemoteOp::Run {
            command: command.to_string(),
        };
        self.fan_out(op, hosts).await
    }

    /// Copy `source` to `target` on every host in `hosts`.
    pub async fn upload(
        &self,
        source: &Path,
        target: &str,
        hosts: &HostSet,
        control_plane: bool,
    ) -> Result<RemoteResults> {
        info!(
            source = %source.display(),
            target = %target,
            hosts = hosts.len(),
            control_plane,
            "execute upload file command"
        );
        let op = RemoteOp::Copy {
            source: source.to_path_buf(),
            target: target.to_string(),
        };
        self.fan_out(op, hosts).await
    }

    async fn fan_out(&self, op: RemoteOp, hosts: &HostSet) -> Result<RemoteResults> {
        let profile = self
            .profile
            .as_ref()
            .ok_or_else(|| PlaybookError::MissingConnectionProfile {
                registry: self.registry_id.clone(),
            })?;

        if hosts.is_empty() {
            warn!("host set is empty; nothing to run");
            return Ok(RemoteResults::new());
        }

        let permits = Arc::new(Semaphore::new(self.max_parallel_hosts));
        let mut units = JoinSet::new();

        for host in hosts {
            let session = SessionSpec::new(host.clone(), profile);
            let transport = Arc::clone(&self.transport);
            let permits = Arc::clone(&permits);
            let op = op.clone();

            units.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = permits.acquire_owned().await.ok();
                let host = session.host.clone();
                let outcome = op.execute(transport.as_ref(), session).await;
                (host, outcome)
            });
        }

        let mut results = RemoteResults::new();
        let mut failures: Vec<(HostName, String)> = Vec::new();
        let mut crashed: Vec<String> = Vec::new();

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((host, Ok(result))) => {
                    print_host_output(&host, &result);
                    results.insert(host, result);
                }
                Ok((host, Err(err))) => {
                    error!(host = %host, error = %err, "remote unit failed");
                    failures.push((host, failure_message(err)));
                }
                Err(join_err) => {
                    error!(error = %join_err, "remote unit panicked");
                    crashed.push(join_err.to_string());
                }
            }
        }

        // A panicked unit loses its host name; attribute it to whichever
        // hosts produced neither a result nor an error.
        if !crashed.is_empty() {
            let orphans: Vec<HostName> = hosts
                .iter()
                .filter(|h| !results.contains_key(*h) && !failures.iter().any(|(f, _)| f == *h))
                .cloned()
                .collect();
            for (host, message) in orphans.into_iter().zip(crashed) {
                failures.push((host, message));
            }
        }

        if let Some((host, message)) = failures.first() {
            let message = if failures.len() > 1 {
                let others: Vec<&str> = failures[1..].iter().map(|(h, _)| h.as_str()).collect();
                format!("{message} (also failed: {})", others.join(", "))
            } else {
                message.clone()
            };
            return Err(PlaybookError::Transport {
                host: host.clone(),
                message,
            });
        }

        Ok(results)
    }
}

fn failure_message(err: PlaybookError) -> String {
    match err {
        PlaybookError::Transport { message, .. } => message,
        other => other.to_string(),
    }
}

fn print_host_output(host: &str, result: &RemoteResult) {
    println!("{host} (done: {}) - output:", result.done);
    if !result.stdout.is_empty() {
        println!("{}", result.stdout.trim_end());
    }
    if !result.stderr.is_empty() {
        println!("std error:");
        println!("{}", result.stderr.trim_end());
    }
    if !result.done {
        warn!(host = %host, exit_code = ?result.exit_code, "remote command exited unsuccessfully");
    }
}
