// src/config/model.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Registry file as read from TOML, before validation.
///
/// ```toml
/// [registry]
/// id = "prod"
/// hostname = "ambari.example.com"
/// port = 8080
/// protocol = "http"
/// username = "admin"
/// password = "admin"
/// cluster = "cl1"
///
/// [connection_profile]
/// username = "root"
/// key_path = "~/.ssh/id_rsa"
/// port = 22
/// timeout = 60
///
/// [engine]
/// max_parallel_hosts = 64
/// ```
///
/// `[connection_profile]` and `[engine]` are optional. Without a connection
/// profile only tasks that never touch the agent hosts can run.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRegistryFile {
    pub registry: RawRegistryEntry,

    #[serde(default)]
    pub connection_profile: Option<RawConnectionProfile>,

    #[serde(default)]
    pub engine: EngineOptions,
}

/// `[registry]` section: how to reach the Ambari server.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRegistryEntry {
    pub id: String,
    pub hostname: String,
    #[serde(default = "default_server_port")]
    pub port: u32,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub cluster: String,
}

/// `[connection_profile]` section: SSH settings for the agent hosts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConnectionProfile {
    pub username: String,
    pub key_path: String,
    #[serde(default = "default_ssh_port")]
    pub port: u32,
    /// Session timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

/// `[engine]` section.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound on concurrently running per-host units in one fan-out.
    #[serde(default = "default_max_parallel_hosts")]
    pub max_parallel_hosts: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_parallel_hosts: default_max_parallel_hosts(),
        }
    }
}

fn default_server_port() -> u32 {
    8080
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_ssh_port() -> u32 {
    22
}

fn default_timeout_secs() -> u64 {
    crate::exec::DEFAULT_SESSION_TIMEOUT_SECS
}

fn default_max_parallel_hosts() -> usize {
    64
}

/// Validated registry configuration, threaded into the engine at
/// construction time.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub registry: RegistryEntry,
    pub connection_profile: Option<ConnectionProfile>,
    pub engine: EngineOptions,
}

impl RegistryConfig {
    /// Build without validation. Only `TryFrom<RawRegistryFile>` and tests
    /// should call this.
    pub fn new_unchecked(
        registry: RegistryEntry,
        connection_profile: Option<ConnectionProfile>,
        engine: EngineOptions,
    ) -> Self {
        Self {
            registry,
            connection_profile,
            engine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Https => f.write_str("https"),
        }
    }
}

/// The active Ambari server entry.
#[derive(Clone)]
pub struct RegistryEntry {
    pub id: String,
    pub hostname: String,
    pub port: u16,
    pub protocol: Protocol,
    pub username: String,
    pub password: String,
    pub cluster: String,
}

impl RegistryEntry {
    /// `protocol://hostname:port`, without trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.hostname, self.port)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &"********")
            .field("cluster", &self.cluster)
            .finish()
    }
}

/// SSH connection settings shared by every host of a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub username: String,
    pub key_path: PathBuf,
    pub port: u16,
    pub timeout: Duration,
}
