// src/playbook/mod.rs

//! Playbook definitions.
//!
//! - [`model`]: YAML-backed raw types and the validated `Playbook`/`Task`.
//! - [`inputs`]: resolving input variables (override, default, prompt).
//! - [`template`]: `{{.Name}}` placeholder rendering.
//! - [`loader`]: read + resolve + render + validate.
//! - [`validate`]: raw → validated conversion, per task type.

pub mod inputs;
pub mod loader;
pub mod model;
pub mod template;
pub mod validate;

pub use inputs::{parse_overrides, resolve_inputs, InputPrompt, NoPrompt, TerminalPrompt};
pub use loader::{load_playbook, load_playbook_str};
pub use model::{Input, Playbook, RawPlaybook, RawTask, Targeting, Task, TaskAction};
