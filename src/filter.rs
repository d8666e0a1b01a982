// src/filter.rs

//! Host targeting.
//!
//! Turns a task's targeting fields into a concrete [`HostSet`]. The most
//! specific filter wins:
//!
//! 1. `ambari_server` → the single control-plane host,
//! 2. `components` → hosts running those components (`services` ignored),
//! 3. `services` → hosts running any component of those services,
//! 4. `hosts` → the explicit list, verbatim,
//! 5. nothing → every host in the cluster.

use tracing::debug;

use crate::errors::Result;
use crate::playbook::Targeting;
use crate::topology::Topology;
use crate::types::{split_list, HostSet};

/// Parsed targeting spec. Lists are already split on commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostFilter {
    pub services: Vec<String>,
    pub components: Vec<String>,
    pub hosts: Vec<String>,
    pub control_plane: bool,
}

impl HostFilter {
    pub fn new(
        services: Option<&str>,
        components: Option<&str>,
        hosts: Option<&str>,
        control_plane: bool,
    ) -> Self {
        Self {
            services: services.map(split_list).unwrap_or_default(),
            components: components.map(split_list).unwrap_or_default(),
            hosts: hosts.map(split_list).unwrap_or_default(),
            control_plane,
        }
    }

    pub fn from_targeting(targeting: &Targeting) -> Self {
        Self {
            services: targeting.services.clone().unwrap_or_default(),
            components: targeting.components.clone().unwrap_or_default(),
            hosts: targeting.hosts.clone().unwrap_or_default(),
            control_plane: targeting.control_plane,
        }
    }

    /// Resolve this filter against the cluster topology.
    pub async fn resolve(&self, topology: &dyn Topology) -> Result<HostSet> {
        let hosts = if self.control_plane {
            let host = topology.control_plane_host().await?;
            HostSet::from([host])
        } else if !self.components.is_empty() {
            topology.list_hosts(None, Some(self.components.as_slice())).await?
        } else if !self.services.is_empty() {
            topology.list_hosts(Some(self.services.as_slice()), None).await?
        } else if !self.hosts.is_empty() {
            self.hosts.iter().cloned().collect()
        } else {
            topology.list_all_hosts().await?
        };

        debug!(filter = ?self, resolved = hosts.len(), "resolved host filter");
        Ok(hosts)
    }
}
