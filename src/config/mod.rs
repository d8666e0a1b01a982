// src/config/mod.rs

//! Registry configuration.
//!
//! The registry file describes the active Ambari server, the SSH connection
//! profile used for agent hosts, and engine tunables.
//!
//! - [`model`] holds the TOML-backed raw types and the validated types.
//! - [`loader`] reads the file from disk.
//! - [`validate`] converts raw into validated config.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_registry_path, load_and_validate, load_from_path};
pub use model::{
    ConnectionProfile, EngineOptions, Protocol, RawRegistryFile, RegistryConfig, RegistryEntry,
};
