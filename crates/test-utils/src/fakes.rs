#![allow(dead_code)]

//! In-memory collaborators for engine tests.
//!
//! Every fake records its calls in an `Arc<Mutex<Vec<_>>>` that tests can
//! clone before handing the fake to the code under test.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ambari_playbook::control_plane::ControlPlane;
use ambari_playbook::errors::{PlaybookError, Result};
use ambari_playbook::exec::{LocalBackend, LocalOutput, RemoteTransport, SessionSpec};
use ambari_playbook::topology::Topology;
use ambari_playbook::types::{BoxFuture, HostName, HostSet, LifecycleTarget, RemoteResult};

/// Topology backed by static maps.
#[derive(Default)]
pub struct FakeTopology {
    pub services: BTreeMap<String, HostSet>,
    pub components: BTreeMap<String, HostSet>,
    pub all: HostSet,
    pub server: HostName,
    pub calls: Arc<Mutex<Vec<TopologyCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyCall {
    ByComponents(Vec<String>),
    ByServices(Vec<String>),
    All,
    ControlPlaneHost,
}

impl FakeTopology {
    pub fn new(server: &str) -> Self {
        let mut all = HostSet::new();
        all.insert(server.to_string());
        Self {
            server: server.to_string(),
            all,
            ..Self::default()
        }
    }

    pub fn service(mut self, name: &str, hosts: &[&str]) -> Self {
        let set: HostSet = hosts.iter().map(|h| h.to_string()).collect();
        self.all.extend(set.iter().cloned());
        self.services.entry(name.to_string()).or_default().extend(set);
        self
    }

    pub fn component(mut self, name: &str, hosts: &[&str]) -> Self {
        let set: HostSet = hosts.iter().map(|h| h.to_string()).collect();
        self.all.extend(set.iter().cloned());
        self.components
            .entry(name.to_string())
            .or_default()
            .extend(set);
        self
    }

    pub fn calls(&self) -> Vec<TopologyCall> {
        self.calls.lock().unwrap().clone()
    }

    fn union(map: &BTreeMap<String, HostSet>, names: &[String]) -> HostSet {
        names
            .iter()
            .filter_map(|n| map.get(n))
            .flat_map(|hosts| hosts.iter().cloned())
            .collect()
    }
}

impl Topology for FakeTopology {
    fn list_hosts<'a>(
        &'a self,
        services: Option<&'a [String]>,
        components: Option<&'a [String]>,
    ) -> BoxFuture<'a, Result<HostSet>> {
        Box::pin(async move {
            let mut calls = self.calls.lock().unwrap();
            match (components, services) {
                (Some(components), _) => {
                    calls.push(TopologyCall::ByComponents(components.to_vec()));
                    Ok(Self::union(&self.components, components))
                }
                (None, Some(services)) => {
                    calls.push(TopologyCall::ByServices(services.to_vec()));
                    Ok(Self::union(&self.services, services))
                }
                (None, None) => {
                    calls.push(TopologyCall::All);
                    Ok(self.all.clone())
                }
            }
        })
    }

    fn list_all_hosts(&self) -> BoxFuture<'_, Result<HostSet>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(TopologyCall::All);
            Ok(self.all.clone())
        })
    }

    fn control_plane_host(&self) -> BoxFuture<'_, Result<HostName>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(TopologyCall::ControlPlaneHost);
            Ok(self.server.clone())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Run { host: HostName, command: String },
    Copy { host: HostName, source: PathBuf, target: String },
}

impl TransportCall {
    pub fn host(&self) -> &str {
        match self {
            TransportCall::Run { host, .. } | TransportCall::Copy { host, .. } => host,
        }
    }
}

/// Remote transport that never leaves the process.
///
/// - hosts in `unreachable` fail with a transport error;
/// - hosts in `exit_codes` report that exit status (`done == false` unless 0);
/// - every other host echoes `"<command> on <host>"` with exit status 0.
///
/// `delay` keeps each unit busy so tests can observe concurrency through
/// `max_in_flight`.
#[derive(Default)]
pub struct FakeTransport {
    pub calls: Arc<Mutex<Vec<TransportCall>>>,
    pub unreachable: BTreeSet<HostName>,
    pub exit_codes: BTreeMap<HostName, i32>,
    pub delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    pub fn exit_code(mut self, host: &str, code: i32) -> Self {
        self.exit_codes.insert(host.to_string(), code);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: TransportCall, stdout: String) -> Result<RemoteResult> {
        let host = call.host().to_string();
        self.calls.lock().unwrap().push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unreachable.contains(&host) {
            return Err(PlaybookError::Transport {
                host,
                message: "connection refused".to_string(),
            });
        }

        let code = self.exit_codes.get(&host).copied().unwrap_or(0);
        Ok(RemoteResult {
            stdout,
            stderr: String::new(),
            done: code == 0,
            exit_code: Some(code),
        })
    }
}

impl RemoteTransport for FakeTransport {
    fn run(&self, session: SessionSpec, command: String) -> BoxFuture<'_, Result<RemoteResult>> {
        Box::pin(async move {
            let stdout = format!("{command} on {}", session.host);
            let call = TransportCall::Run {
                host: session.host,
                command,
            };
            self.respond(call, stdout).await
        })
    }

    fn copy(
        &self,
        session: SessionSpec,
        source: PathBuf,
        target: String,
    ) -> BoxFuture<'_, Result<RemoteResult>> {
        Box::pin(async move {
            let call = TransportCall::Copy {
                host: session.host,
                source,
                target,
            };
            self.respond(call, String::new()).await
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneCall {
    Lifecycle { command: String, target: LifecycleTarget },
    Config { config_type: String, key: String, value: String },
}

/// Control plane that records every request.
#[derive(Default)]
pub struct FakeControlPlane {
    pub calls: Arc<Mutex<Vec<ControlPlaneCall>>>,
    pub fail: bool,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ControlPlaneCall> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<()> {
        if self.fail {
            return Err(PlaybookError::ControlPlane("HTTP 500".to_string()));
        }
        Ok(())
    }
}

impl ControlPlane for FakeControlPlane {
    fn send_lifecycle_command<'a>(
        &'a self,
        command: &'a str,
        target: &'a LifecycleTarget,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ControlPlaneCall::Lifecycle {
                command: command.to_string(),
                target: target.clone(),
            });
            self.outcome()
        })
    }

    fn update_config<'a>(
        &'a self,
        config_type: &'a str,
        config_key: &'a str,
        config_value: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ControlPlaneCall::Config {
                config_type: config_type.to_string(),
                key: config_key.to_string(),
                value: config_value.to_string(),
            });
            self.outcome()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCall {
    Command { program: String, args: Vec<String> },
    Download { url: String, dest: PathBuf },
}

/// Local backend that records commands and downloads without running them.
#[derive(Default)]
pub struct FakeLocalBackend {
    pub calls: Arc<Mutex<Vec<LocalCall>>>,
    pub fail: bool,
}

impl FakeLocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<LocalCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl LocalBackend for FakeLocalBackend {
    fn run_command(
        &self,
        program: String,
        args: Vec<String>,
    ) -> BoxFuture<'_, Result<LocalOutput>> {
        Box::pin(async move {
            let stdout = args.join(" ");
            self.calls
                .lock()
                .unwrap()
                .push(LocalCall::Command { program: program.clone(), args });
            if self.fail {
                return Err(PlaybookError::LocalCommand(format!(
                    "'{program}' exited with status 1"
                )));
            }
            Ok(LocalOutput {
                stdout,
                stderr: String::new(),
            })
        })
    }

    fn download(&self, url: String, dest: PathBuf) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(LocalCall::Download { url, dest });
            if self.fail {
                return Err(PlaybookError::Network("HTTP status server error (500)".to_string()));
            }
            Ok(0)
        })
    }
}
