// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawRegistryFile, RegistryConfig};
use crate::errors::Result;

/// Load a registry file from a given path and return the raw
/// `RawRegistryFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to also
/// check ports, protocol and the connection profile.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRegistryFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawRegistryFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a registry file from path and validate it.
///
/// This is the entry point the CLI uses; the resulting [`RegistryConfig`] is
/// the single, read-only description of the active Ambari server for a run.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RegistryConfig> {
    let raw = load_from_path(&path)?;
    RegistryConfig::try_from(raw)
}

/// Default registry location: `ambari-registry.toml` in the current
/// working directory.
pub fn default_registry_path() -> PathBuf {
    PathBuf::from("ambari-registry.toml")
}
