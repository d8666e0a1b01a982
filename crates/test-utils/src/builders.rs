#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use ambari_playbook::config::{
    ConnectionProfile, EngineOptions, Protocol, RegistryConfig, RegistryEntry,
};
use ambari_playbook::playbook::{Input, Playbook, RawPlaybook, RawTask};

/// Builder for `RegistryConfig` to simplify test setup.
///
/// Defaults to an `http://ambari.test:8080` server for cluster `cl1` with a
/// connection profile attached.
pub struct RegistryConfigBuilder {
    entry: RegistryEntry,
    profile: Option<ConnectionProfile>,
    engine: EngineOptions,
}

impl RegistryConfigBuilder {
    pub fn new() -> Self {
        Self {
            entry: RegistryEntry {
                id: "test".to_string(),
                hostname: "ambari.test".to_string(),
                port: 8080,
                protocol: Protocol::Http,
                username: "admin".to_string(),
                password: "admin".to_string(),
                cluster: "cl1".to_string(),
            },
            profile: Some(ConnectionProfile {
                username: "root".to_string(),
                key_path: PathBuf::from("/tmp/id_rsa"),
                port: 22,
                timeout: Duration::from_secs(5),
            }),
            engine: EngineOptions::default(),
        }
    }

    pub fn server_host(mut self, hostname: &str) -> Self {
        self.entry.hostname = hostname.to_string();
        self
    }

    pub fn cluster(mut self, cluster: &str) -> Self {
        self.entry.cluster = cluster.to_string();
        self
    }

    pub fn without_connection_profile(mut self) -> Self {
        self.profile = None;
        self
    }

    pub fn max_parallel_hosts(mut self, n: usize) -> Self {
        self.engine.max_parallel_hosts = n;
        self
    }

    pub fn entry(&self) -> RegistryEntry {
        self.entry.clone()
    }

    pub fn build(self) -> RegistryConfig {
        RegistryConfig::new_unchecked(self.entry, self.profile, self.engine)
    }
}

impl Default for RegistryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawTask`.
pub struct TaskBuilder {
    task: RawTask,
}

impl TaskBuilder {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            task: RawTask {
                name: name.to_string(),
                kind: Some(kind.to_string()),
                ..RawTask::default()
            },
        }
    }

    /// A task with no `type` field at all.
    pub fn untyped(name: &str) -> Self {
        Self {
            task: RawTask {
                name: name.to_string(),
                ..RawTask::default()
            },
        }
    }

    pub fn remote(name: &str, command: &str) -> Self {
        Self::new(name, "RemoteCommand").command(command)
    }

    pub fn local(name: &str, command: &str) -> Self {
        Self::new(name, "LocalCommand").command(command)
    }

    pub fn command(mut self, command: &str) -> Self {
        self.task.command = Some(command.to_string());
        self
    }

    pub fn services(mut self, services: &str) -> Self {
        self.task.services = Some(services.to_string());
        self
    }

    pub fn components(mut self, components: &str) -> Self {
        self.task.components = Some(components.to_string());
        self
    }

    pub fn hosts(mut self, hosts: &str) -> Self {
        self.task.hosts = Some(hosts.to_string());
        self
    }

    pub fn ambari_server(mut self) -> Self {
        self.task.ambari_server = true;
        self
    }

    pub fn ambari_agent(mut self) -> Self {
        self.task.ambari_agent = true;
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.task
            .parameters
            .insert(key.to_string(), serde_yaml::Value::String(value.to_string()));
        self
    }

    pub fn build(self) -> RawTask {
        self.task
    }
}

/// Builder for `Playbook` (validated) or `RawPlaybook`.
pub struct PlaybookBuilder {
    playbook: RawPlaybook,
}

impl PlaybookBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            playbook: RawPlaybook {
                name: name.to_string(),
                ..RawPlaybook::default()
            },
        }
    }

    pub fn task(mut self, task: TaskBuilder) -> Self {
        self.playbook.tasks.push(task.build());
        self
    }

    pub fn input(mut self, name: &str, default: Option<&str>) -> Self {
        self.playbook.inputs.push(Input {
            name: name.to_string(),
            default: default.map(str::to_string),
        });
        self
    }

    pub fn raw(self) -> RawPlaybook {
        self.playbook
    }

    pub fn build(self) -> Playbook {
        Playbook::try_from(self.playbook).expect("Failed to build valid playbook from builder")
    }
}

/// Host set from string literals.
pub fn hosts(names: &[&str]) -> ambari_playbook::types::HostSet {
    names.iter().map(|h| h.to_string()).collect()
}

/// Override map from `(name, value)` pairs.
pub fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
