// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] defines the transport traits (`RemoteTransport`,
//!   `LocalBackend`) the executors run on, so tests can swap in fakes.
//! - [`remote`] fans one command or file copy out to a host set and joins
//!   on all hosts before returning.
//! - [`ssh`] is the production `RemoteTransport` (system `ssh`/`scp`).
//! - [`local`] runs local commands and downloads files.

pub mod backend;
pub mod local;
pub mod remote;
pub mod ssh;

pub use backend::{LocalBackend, LocalOutput, RemoteTransport, SessionSpec};
pub use local::{split_command, LocalExecutor, SystemLocalBackend};
pub use remote::RemoteExecutor;
pub use ssh::SshTransport;

/// Session timeout used when the connection profile does not set one.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 60;
