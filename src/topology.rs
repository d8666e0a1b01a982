// src/topology.rs

//! Cluster topology queries.
//!
//! The engine never talks to the control plane directly for host lookups;
//! it goes through [`Topology`], which the Ambari HTTP client implements in
//! production and tests replace with an in-memory fake.

use crate::errors::Result;
use crate::types::{BoxFuture, HostName, HostSet};

pub trait Topology: Send + Sync {
    /// Hosts running any component of `services`, or running any of
    /// `components`. When both are given the component lookup wins.
    fn list_hosts<'a>(
        &'a self,
        services: Option<&'a [String]>,
        components: Option<&'a [String]>,
    ) -> BoxFuture<'a, Result<HostSet>>;

    /// Every host registered in the cluster.
    fn list_all_hosts(&self) -> BoxFuture<'_, Result<HostSet>>;

    /// The host the control plane itself runs on.
    fn control_plane_host(&self) -> BoxFuture<'_, Result<HostName>>;
}
