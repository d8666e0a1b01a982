// src/exec/backend.rs

//! Pluggable transport abstractions.
//!
//! The executors talk to a [`RemoteTransport`] and a [`LocalBackend`]
//! instead of spawning `ssh` or hitting the network directly. Production
//! code uses [`SshTransport`](super::ssh::SshTransport) and
//! [`SystemLocalBackend`](super::local::SystemLocalBackend); tests provide
//! fakes that record calls and simulate failures.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConnectionProfile;
use crate::errors::Result;
use crate::types::{BoxFuture, HostName, RemoteResult};

/// Everything needed to open a session to one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    pub host: HostName,
    pub user: String,
    pub key_path: PathBuf,
    pub port: u16,
    pub timeout: Duration,
}

impl SessionSpec {
    pub fn new(host: impl Into<HostName>, profile: &ConnectionProfile) -> Self {
        Self {
            host: host.into(),
            user: profile.username.clone(),
            key_path: profile.key_path.clone(),
            port: profile.port,
            timeout: profile.timeout,
        }
    }
}

/// Remote shell transport.
///
/// A returned `Err` means the *session* failed (host unreachable, auth
/// refused, timeout). A command that ran and exited non-zero is an `Ok`
/// result with `done == false`.
pub trait RemoteTransport: Send + Sync {
    fn run(&self, session: SessionSpec, command: String) -> BoxFuture<'_, Result<RemoteResult>>;

    fn copy(
        &self,
        session: SessionSpec,
        source: PathBuf,
        target: String,
    ) -> BoxFuture<'_, Result<RemoteResult>>;
}

/// Captured output of a local process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Local process execution and plain HTTP download.
pub trait LocalBackend: Send + Sync {
    /// Run `program` with `args`; non-zero exit is an error.
    fn run_command(&self, program: String, args: Vec<String>)
        -> BoxFuture<'_, Result<LocalOutput>>;

    /// Stream `url` into `dest`, returning the number of bytes written.
    fn download(&self, url: String, dest: PathBuf) -> BoxFuture<'_, Result<u64>>;
}
