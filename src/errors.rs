// src/errors.rs

//! Crate-wide error type.
//!
//! Every failure the engine can hit ends up here. Nothing is retried and
//! nothing is swallowed: the runner wraps execution failures in
//! [`PlaybookError::TaskFailed`] so the operator sees which task broke, and
//! the binary turns any error into a non-zero exit status.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybookError {
    /// Missing/unknown task type, missing required parameter, bad input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid registry/engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No connection profile is attached to the active registry entry '{registry}'")]
    MissingConnectionProfile { registry: String },

    /// Remote session failure on a single host. Fatal for the playbook.
    #[error("Transport error on host '{host}': {message}")]
    Transport { host: String, message: String },

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Control plane error: {0}")]
    ControlPlane(String),

    #[error("Local command failed: {0}")]
    LocalCommand(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An execution failure, tagged with the task that caused the abort.
    #[error("task '{task}' failed after {completed} completed task(s): {source}")]
    TaskFailed {
        task: String,
        completed: usize,
        #[source]
        source: Box<PlaybookError>,
    },
}

impl PlaybookError {
    /// The innermost error, looking through [`PlaybookError::TaskFailed`].
    pub fn root_cause(&self) -> &PlaybookError {
        match self {
            PlaybookError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<reqwest::Error> for PlaybookError {
    fn from(err: reqwest::Error) -> Self {
        PlaybookError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlaybookError>;
