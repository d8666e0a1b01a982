// src/playbook/template.rs

//! `{{.Name}}` placeholder substitution over the raw playbook text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{PlaybookError, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("placeholder pattern is a valid regex")
});

/// Replace every `{{.Name}}` (whitespace inside the braces allowed) with the
/// value of `Name` from `vars`.
///
/// Fails with [`PlaybookError::Template`] listing every placeholder that has
/// no value, instead of silently rendering an empty string.
pub fn render(text: &str, vars: &BTreeMap<String, String>) -> Result<String> {
    let missing: BTreeSet<&str> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !vars.contains_key(*name))
        .collect();

    if !missing.is_empty() {
        return Err(PlaybookError::Template(format!(
            "no value for placeholder(s): {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let rendered = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        vars.get(&caps[1]).cloned().unwrap_or_default()
    });

    Ok(rendered.into_owned())
}

/// Names of all placeholders referenced by `text`, in order of first use.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
