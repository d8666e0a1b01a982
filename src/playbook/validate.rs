// src/playbook/validate.rs

//! Raw → validated playbook conversion.
//!
//! Every task is checked here, before the runner starts, so a playbook with
//! a missing/unknown `type` or a missing required parameter never produces
//! side effects.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::errors::{PlaybookError, Result};
use crate::playbook::model::{
    scalar_to_string, Playbook, RawPlaybook, RawTask, Targeting, Task, TaskAction,
};
use crate::types::{split_list, TaskKind};

impl TryFrom<RawPlaybook> for Playbook {
    type Error = PlaybookError;

    fn try_from(raw: RawPlaybook) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;
        validate_inputs(&raw)?;

        let tasks = raw
            .tasks
            .into_iter()
            .enumerate()
            .map(|(idx, task)| validate_task(idx, task))
            .collect::<Result<Vec<_>>>()?;

        Ok(Playbook {
            name: raw.name,
            description: raw.description,
            tasks,
            inputs: raw.inputs,
        })
    }
}

fn ensure_has_tasks(raw: &RawPlaybook) -> Result<()> {
    if raw.tasks.is_empty() {
        return Err(PlaybookError::Validation(
            "playbook must contain at least one task".to_string(),
        ));
    }
    Ok(())
}

fn validate_inputs(raw: &RawPlaybook) -> Result<()> {
    let mut seen = HashSet::new();
    for input in &raw.inputs {
        if input.name.trim().is_empty() {
            return Err(PlaybookError::Validation(
                "playbook input with an empty name".to_string(),
            ));
        }
        if !seen.insert(input.name.as_str()) {
            return Err(PlaybookError::Validation(format!(
                "playbook input '{}' is declared more than once",
                input.name
            )));
        }
    }
    Ok(())
}

/// Human-readable label: the task name, or its 1-based position.
fn task_label(idx: usize, name: &str) -> String {
    if name.trim().is_empty() {
        format!("#{}", idx + 1)
    } else {
        name.to_string()
    }
}

fn validate_task(idx: usize, raw: RawTask) -> Result<Task> {
    let label = task_label(idx, &raw.name);

    let kind = match raw.kind.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(PlaybookError::Validation(format!(
                "type field for task '{label}' is required"
            )));
        }
        Some(kind) => kind.parse::<TaskKind>().map_err(|e| {
            PlaybookError::Validation(format!("task '{label}': {e}"))
        })?,
    };

    let targeting = Targeting {
        services: name_list(raw.services.as_deref()),
        components: name_list(raw.components.as_deref()),
        hosts: name_list(raw.hosts.as_deref()),
        control_plane: raw.ambari_server,
        agent_only: raw.ambari_agent,
    };

    let params = Params {
        label: &label,
        kind,
        values: &raw.parameters,
    };

    let action = match kind {
        TaskKind::RemoteCommand => TaskAction::RemoteCommand {
            command: require_command(&label, kind, raw.command)?,
        },
        TaskKind::LocalCommand => TaskAction::LocalCommand {
            command: require_command(&label, kind, raw.command)?,
        },
        TaskKind::Download => TaskAction::Download {
            url: params.require("url")?,
            file: PathBuf::from(params.require("file")?),
        },
        TaskKind::Upload => TaskAction::Upload {
            source: PathBuf::from(params.require("source")?),
            target: params.require("target")?,
        },
        TaskKind::Config => TaskAction::Config {
            config_type: params.require("config_type")?,
            config_key: params.require("config_key")?,
            config_value: params.require_present("config_value")?,
        },
        TaskKind::AmbariCommand => {
            if targeting.components.is_none() && targeting.services.is_none() {
                return Err(PlaybookError::Validation(format!(
                    "'components' or 'services' filter is required for '{kind}' task '{label}'"
                )));
            }
            TaskAction::AmbariCommand {
                command: require_command(&label, kind, raw.command)?,
            }
        }
    };

    Ok(Task {
        name: label,
        targeting,
        action,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn name_list(value: Option<&str>) -> Option<Vec<String>> {
    value.map(split_list).filter(|names| !names.is_empty())
}

fn require_command(label: &str, kind: TaskKind, command: Option<String>) -> Result<String> {
    non_blank(command).ok_or_else(|| {
        PlaybookError::Validation(format!(
            "'command' field is required for '{kind}' task '{label}'"
        ))
    })
}

struct Params<'a> {
    label: &'a str,
    kind: TaskKind,
    values: &'a BTreeMap<String, serde_yaml::Value>,
}

impl Params<'_> {
    /// A required, non-blank scalar parameter.
    fn require(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .and_then(scalar_to_string)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| self.missing(key))
    }

    /// A required scalar parameter that may be empty (e.g. clearing a
    /// config property).
    fn require_present(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .and_then(scalar_to_string)
            .ok_or_else(|| self.missing(key))
    }

    fn missing(&self, key: &str) -> PlaybookError {
        PlaybookError::Validation(format!(
            "'{key}' parameter is required for '{}' task '{}'",
            self.kind, self.label
        ))
    }
}
