// src/playbook/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::Result;
use crate::playbook::inputs::{resolve_inputs, InputPrompt};
use crate::playbook::model::{Input, Playbook, RawPlaybook};
use crate::playbook::template;

/// Only the `inputs` of a playbook; everything else is ignored on the first
/// pass because it may still contain unrendered placeholders.
#[derive(Debug, Deserialize)]
struct InputsOnly {
    #[serde(default)]
    inputs: Vec<Input>,
}

/// Load a playbook file, resolve its inputs, render placeholders and
/// validate every task.
pub fn load_playbook(
    path: impl AsRef<Path>,
    overrides: &BTreeMap<String, String>,
    prompt: &dyn InputPrompt,
) -> Result<Playbook> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let playbook = load_playbook_str(&text, overrides, prompt)?;

    info!(
        playbook = %playbook.name,
        file = %path.display(),
        tasks = playbook.tasks.len(),
        "loaded playbook"
    );

    Ok(playbook)
}

/// Same as [`load_playbook`], from an in-memory document.
///
/// 1. Parse the `inputs` section.
/// 2. Resolve input values (override → default → prompt).
/// 3. Render `{{.Name}}` placeholders in the whole document.
/// 4. Parse and validate the rendered document.
pub fn load_playbook_str(
    text: &str,
    overrides: &BTreeMap<String, String>,
    prompt: &dyn InputPrompt,
) -> Result<Playbook> {
    let InputsOnly { inputs } = serde_yaml::from_str(text)?;
    debug!(
        inputs = inputs.len(),
        placeholders = ?template::placeholders(text),
        "parsed playbook inputs"
    );

    let vars = resolve_inputs(&inputs, overrides, prompt)?;
    let rendered = template::render(text, &vars)?;

    let raw: RawPlaybook = serde_yaml::from_str(&rendered)?;
    Playbook::try_from(raw)
}
