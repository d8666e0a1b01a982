// src/playbook/inputs.rs

//! Resolution of playbook inputs.
//!
//! Precedence for each declared input, evaluated once before any task runs:
//! 1. a value supplied on the command line (`--vars "A=x B=y"`),
//! 2. the input's `default`,
//! 3. an interactive prompt.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::errors::{PlaybookError, Result};
use crate::playbook::model::Input;

/// Source of values for inputs that have neither an override nor a default.
pub trait InputPrompt: Send + Sync {
    fn ask(&self, name: &str) -> Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt;

impl InputPrompt for TerminalPrompt {
    fn ask(&self, name: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(format!("Enter {name}"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PlaybookError::Validation(format!("reading value for input '{name}': {e}")))
    }
}

/// Prompt that refuses to ask; used for non-interactive runs.
#[derive(Debug, Clone, Default)]
pub struct NoPrompt;

impl InputPrompt for NoPrompt {
    fn ask(&self, name: &str) -> Result<String> {
        Err(PlaybookError::Validation(format!(
            "input '{name}' has no default and no value was supplied"
        )))
    }
}

/// Parse `"A=x B=y"` into a map. Values may contain `=`; pairs are
/// separated by whitespace, so values cannot contain spaces.
pub fn parse_overrides(vars: &str) -> Result<BTreeMap<String, String>> {
    vars.split_whitespace()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(PlaybookError::Validation(format!(
                "invalid variable '{pair}' (expected NAME=VALUE)"
            ))),
        })
        .collect()
}

/// Resolve every declared input into a value.
///
/// Overrides for names the playbook does not declare are kept, so they can
/// still be used as placeholders.
pub fn resolve_inputs(
    inputs: &[Input],
    overrides: &BTreeMap<String, String>,
    prompt: &dyn InputPrompt,
) -> Result<BTreeMap<String, String>> {
    let mut resolved = overrides.clone();

    for input in inputs {
        if let Some(value) = overrides.get(&input.name) {
            info!(input = %input.name, value = %value, "found input");
            continue;
        }

        let value = match input.default.as_deref() {
            Some(default) if !default.is_empty() => {
                debug!(input = %input.name, "using default value");
                default.to_string()
            }
            _ => prompt.ask(&input.name)?,
        };

        resolved.insert(input.name.clone(), value);
    }

    Ok(resolved)
}
