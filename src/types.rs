// src/types.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Host identifier as reported by the control plane (usually an FQDN).
pub type HostName = String;

/// Set of targeted hosts. Only membership matters.
pub type HostSet = BTreeSet<HostName>;

/// Per-host results of a remote fan-out, one entry per targeted host.
pub type RemoteResults = BTreeMap<HostName, RemoteResult>;

/// Output of a command (or copy) on a single remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResult {
    pub stdout: String,
    pub stderr: String,
    /// `true` if the remote command ran to completion with a zero exit status.
    pub done: bool,
    /// Exit status reported by the remote side, if any.
    pub exit_code: Option<i32>,
}

/// The closed set of task kinds a playbook may contain.
///
/// Names follow the playbook format (`RemoteCommand`, `AmbariCommand`, ...);
/// parsing is case-insensitive and also accepts kebab/snake case spellings
/// such as `remote-command` or `control_plane_command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    RemoteCommand,
    LocalCommand,
    Download,
    Upload,
    Config,
    AmbariCommand,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::RemoteCommand,
        TaskKind::LocalCommand,
        TaskKind::Download,
        TaskKind::Upload,
        TaskKind::Config,
        TaskKind::AmbariCommand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::RemoteCommand => "RemoteCommand",
            TaskKind::LocalCommand => "LocalCommand",
            TaskKind::Download => "Download",
            TaskKind::Upload => "Upload",
            TaskKind::Config => "Config",
            TaskKind::AmbariCommand => "AmbariCommand",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "remotecommand" => Ok(TaskKind::RemoteCommand),
            "localcommand" => Ok(TaskKind::LocalCommand),
            "download" => Ok(TaskKind::Download),
            "upload" => Ok(TaskKind::Upload),
            "config" | "configupdate" => Ok(TaskKind::Config),
            "ambaricommand" | "controlplanecommand" => Ok(TaskKind::AmbariCommand),
            _ => Err(format!(
                "unknown task type: {s} (expected one of {})",
                TaskKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Which kind of topology unit a control-plane lifecycle command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleScope {
    Service,
    Component,
}

/// Target of a single lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleTarget {
    Service(String),
    Component(String),
}

impl LifecycleTarget {
    pub fn new(scope: LifecycleScope, name: impl Into<String>) -> Self {
        match scope {
            LifecycleScope::Service => LifecycleTarget::Service(name.into()),
            LifecycleScope::Component => LifecycleTarget::Component(name.into()),
        }
    }
}

impl fmt::Display for LifecycleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleTarget::Service(name) => write!(f, "service {name}"),
            LifecycleTarget::Component(name) => write!(f, "component {name}"),
        }
    }
}

/// Split a comma-separated filter value into trimmed, non-empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Boxed, `Send` future returned by the collaborator traits.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
