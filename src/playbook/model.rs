// src/playbook/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::TaskKind;

/// Playbook document as read from YAML (after templating), before
/// validation.
///
/// ```yaml
/// name: restart-datanodes
/// description: Stop and start every DataNode
/// inputs:
///   - name: service
///     default: datanode
/// tasks:
///   - name: stop
///     type: RemoteCommand
///     command: systemctl stop {{.service}}
///     components: DATANODE
///   - name: push config
///     type: Upload
///     hosts: "c7401.ambari.apache.org,c7402.ambari.apache.org"
///     parameters:
///       source: /tmp/hdfs-site.xml
///       target: /etc/hadoop/conf/hdfs-site.xml
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPlaybook {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tasks: Vec<RawTask>,

    #[serde(default)]
    pub inputs: Vec<Input>,
}

/// A single task entry, exactly as written in the playbook.
///
/// Everything is optional here; which fields are required depends on `type`
/// and is checked when converting into [`Task`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTask {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub command: Option<String>,

    /// Comma-separated service names (`services: HDFS,YARN`).
    #[serde(default)]
    pub services: Option<String>,

    /// Comma-separated component names (`components: DATANODE`).
    #[serde(default)]
    pub components: Option<String>,

    /// Comma-separated explicit host names.
    #[serde(default)]
    pub hosts: Option<String>,

    /// Target only the Ambari server host.
    #[serde(default)]
    pub ambari_server: bool,

    /// Skip host filtering; the executor decides targeting.
    #[serde(default)]
    pub ambari_agent: bool,

    /// Type-specific parameters. Values may be any YAML scalar.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_yaml::Value>,
}

/// A substitution variable declared by the playbook.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Input {
    pub name: String,

    #[serde(default, deserialize_with = "scalar_opt")]
    pub default: Option<String>,
}

fn scalar_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

/// Render a YAML scalar as the string a user would expect to see.
///
/// Returns `None` for null, sequences and mappings.
pub fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Validated, immutable playbook.
#[derive(Debug, Clone)]
pub struct Playbook {
    pub name: String,
    pub description: String,
    pub tasks: Vec<Task>,
    pub inputs: Vec<Input>,
}

/// Validated task: a name, where it runs, and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub targeting: Targeting,
    pub action: TaskAction,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        self.action.kind()
    }
}

/// Host targeting fields of a task, split on commas.
///
/// A list with no non-blank entries (`""`, `" , "`) is `None`, so every
/// consumer sees the same "absent" filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targeting {
    pub services: Option<Vec<String>>,
    pub components: Option<Vec<String>>,
    pub hosts: Option<Vec<String>>,
    pub control_plane: bool,
    pub agent_only: bool,
}

/// What a task does, with the fields its type requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    RemoteCommand {
        command: String,
    },
    LocalCommand {
        command: String,
    },
    Download {
        url: String,
        file: PathBuf,
    },
    Upload {
        source: PathBuf,
        target: String,
    },
    Config {
        config_type: String,
        config_key: String,
        config_value: String,
    },
    AmbariCommand {
        command: String,
    },
}

impl TaskAction {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskAction::RemoteCommand { .. } => TaskKind::RemoteCommand,
            TaskAction::LocalCommand { .. } => TaskKind::LocalCommand,
            TaskAction::Download { .. } => TaskKind::Download,
            TaskAction::Upload { .. } => TaskKind::Upload,
            TaskAction::Config { .. } => TaskKind::Config,
            TaskAction::AmbariCommand { .. } => TaskKind::AmbariCommand,
        }
    }

    /// Whether this action needs a host set resolved before dispatch.
    pub fn uses_hosts(&self) -> bool {
        matches!(
            self,
            TaskAction::RemoteCommand { .. } | TaskAction::Upload { .. }
        )
    }
}
