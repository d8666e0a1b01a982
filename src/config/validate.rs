// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    ConnectionProfile, Protocol, RawConnectionProfile, RawRegistryEntry, RawRegistryFile,
    RegistryConfig, RegistryEntry,
};
use crate::errors::{PlaybookError, Result};

impl TryFrom<RawRegistryFile> for RegistryConfig {
    type Error = PlaybookError;

    fn try_from(raw: RawRegistryFile) -> std::result::Result<Self, Self::Error> {
        let registry = validate_registry(raw.registry)?;
        let connection_profile = raw
            .connection_profile
            .map(validate_connection_profile)
            .transpose()?;

        if raw.engine.max_parallel_hosts == 0 {
            return Err(PlaybookError::Config(
                "[engine].max_parallel_hosts must be >= 1 (got 0)".to_string(),
            ));
        }

        Ok(RegistryConfig::new_unchecked(
            registry,
            connection_profile,
            raw.engine,
        ))
    }
}

fn validate_registry(raw: RawRegistryEntry) -> Result<RegistryEntry> {
    ensure_not_blank("[registry].id", &raw.id)?;
    ensure_not_blank("[registry].hostname", &raw.hostname)?;
    ensure_not_blank("[registry].username", &raw.username)?;
    ensure_not_blank("[registry].cluster", &raw.cluster)?;

    let protocol = match raw.protocol.trim().to_lowercase().as_str() {
        "http" => Protocol::Http,
        "https" => Protocol::Https,
        other => {
            return Err(PlaybookError::Config(format!(
                "[registry].protocol must be \"http\" or \"https\" (got \"{other}\")"
            )));
        }
    };

    Ok(RegistryEntry {
        id: raw.id,
        hostname: raw.hostname.trim().to_string(),
        port: validate_port("[registry].port", raw.port)?,
        protocol,
        username: raw.username,
        password: raw.password,
        cluster: raw.cluster,
    })
}

fn validate_connection_profile(raw: RawConnectionProfile) -> Result<ConnectionProfile> {
    ensure_not_blank("[connection_profile].username", &raw.username)?;
    ensure_not_blank("[connection_profile].key_path", &raw.key_path)?;

    if raw.timeout == 0 {
        return Err(PlaybookError::Config(
            "[connection_profile].timeout must be >= 1 second (got 0)".to_string(),
        ));
    }

    let key_path = shellexpand::tilde(raw.key_path.trim()).into_owned();

    Ok(ConnectionProfile {
        username: raw.username,
        key_path: PathBuf::from(key_path),
        port: validate_port("[connection_profile].port", raw.port)?,
        timeout: Duration::from_secs(raw.timeout),
    })
}

fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlaybookError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_port(field: &str, port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(PlaybookError::Config(format!(
            "{field} must be between 1 and 65535 (got {port})"
        ))),
    }
}
