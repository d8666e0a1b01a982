// src/control_plane/mod.rs

//! Control-plane commands.
//!
//! - [`ControlPlane`] is the collaborator interface (lifecycle + config).
//! - [`ControlPlaneAdapter`] decides which lifecycle path a task takes and
//!   validates config updates before calling the control plane.
//! - [`client`] is the Ambari REST implementation of both `ControlPlane`
//!   and [`Topology`](crate::topology::Topology).

pub mod client;

use std::sync::Arc;

use tracing::info;

use crate::errors::{PlaybookError, Result};
use crate::playbook::Targeting;
use crate::types::{BoxFuture, LifecycleScope, LifecycleTarget};

pub use client::AmbariClient;

pub trait ControlPlane: Send + Sync {
    /// Issue a lifecycle command (`START`, `STOP`, ...) for one service or
    /// component.
    fn send_lifecycle_command<'a>(
        &'a self,
        command: &'a str,
        target: &'a LifecycleTarget,
    ) -> BoxFuture<'a, Result<()>>;

    /// Set `key = value` in the configuration of type `config_type`.
    fn update_config<'a>(
        &'a self,
        config_type: &'a str,
        config_key: &'a str,
        config_value: &'a str,
    ) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone)]
pub struct ControlPlaneAdapter {
    client: Arc<dyn ControlPlane>,
}

impl std::fmt::Debug for ControlPlaneAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneAdapter").finish_non_exhaustive()
    }
}

impl ControlPlaneAdapter {
    pub fn new(client: Arc<dyn ControlPlane>) -> Self {
        Self { client }
    }

    /// Run a lifecycle command for the task's components, or, if it has
    /// none, for its services. Only one of the two paths ever fires.
    ///
    /// Returns the scope that was used.
    pub async fn run_lifecycle(
        &self,
        command: &str,
        targeting: &Targeting,
    ) -> Result<LifecycleScope> {
        let (scope, names) = if let Some(components) = targeting.components.as_deref() {
            (LifecycleScope::Component, components)
        } else if let Some(services) = targeting.services.as_deref() {
            (LifecycleScope::Service, services)
        } else {
            return Err(PlaybookError::Validation(
                "control-plane command needs a 'components' or 'services' filter".to_string(),
            ));
        };

        self.run_service_or_component_command(command, names, scope)
            .await?;
        Ok(scope)
    }

    /// Issue `command` against every named service or component, in order.
    pub async fn run_service_or_component_command(
        &self,
        command: &str,
        names: &[String],
        scope: LifecycleScope,
    ) -> Result<()> {
        if names.is_empty() {
            return Err(PlaybookError::Validation(format!(
                "no {scope:?} names given for control-plane command '{command}'"
            )));
        }

        for name in names {
            let target = LifecycleTarget::new(scope, name.clone());
            info!(command = %command, target = %target, "execute control-plane command");
            self.client.send_lifecycle_command(command, &target).await?;
        }
        Ok(())
    }

    /// Update one configuration property. All three values are mandatory.
    pub async fn set_config(
        &self,
        config_type: &str,
        config_key: &str,
        config_value: &str,
    ) -> Result<()> {
        for (field, value) in [("config_type", config_type), ("config_key", config_key)] {
            if value.trim().is_empty() {
                return Err(PlaybookError::Validation(format!(
                    "'{field}' parameter is required for 'Config' task"
                )));
            }
        }

        info!(
            config_type = %config_type,
            config_key = %config_key,
            "execute config update"
        );
        self.client
            .update_config(config_type, config_key, config_value)
            .await
    }
}
