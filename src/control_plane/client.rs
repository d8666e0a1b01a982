// src/control_plane/client.rs

//! Ambari REST API (v1) client.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::RegistryEntry;
use crate::control_plane::ControlPlane;
use crate::errors::{PlaybookError, Result};
use crate::topology::Topology;
use crate::types::{BoxFuture, HostName, HostSet, LifecycleTarget};

const REQUESTED_BY: &str = "ambari";

/// Ambari list envelope. An absent `items` key reads as an empty page.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Items<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct HostItem {
    #[serde(rename = "Hosts")]
    hosts: HostRef,
}

#[derive(Debug, Deserialize)]
struct HostComponentItem {
    #[serde(rename = "HostRoles")]
    host_roles: HostRef,
}

#[derive(Debug, Deserialize)]
struct HostRef {
    host_name: HostName,
}

#[derive(Debug, Deserialize)]
struct ClusterItem {
    #[serde(rename = "Clusters")]
    clusters: DesiredConfigs,
}

#[derive(Debug, Deserialize)]
struct DesiredConfigs {
    #[serde(default)]
    desired_configs: BTreeMap<String, ConfigTag>,
}

#[derive(Debug, Deserialize)]
struct ConfigTag {
    tag: String,
}

#[derive(Debug, Deserialize)]
struct ConfigurationItem {
    #[serde(default)]
    properties: Map<String, Value>,
}

/// Map a lifecycle verb to the desired state Ambari expects.
pub fn desired_state(command: &str) -> String {
    match command.trim().to_uppercase().as_str() {
        "START" => "STARTED".to_string(),
        "STOP" | "INSTALL" => "INSTALLED".to_string(),
        other => other.to_string(),
    }
}

/// HTTP client for one Ambari server / cluster.
#[derive(Clone)]
pub struct AmbariClient {
    http: Client,
    base_url: String,
    cluster: String,
    username: String,
    password: String,
    server_host: HostName,
}

impl std::fmt::Debug for AmbariClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbariClient")
            .field("base_url", &self.base_url)
            .field("cluster", &self.cluster)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AmbariClient {
    pub fn new(entry: &RegistryEntry) -> Self {
        Self::with_base_url(entry, entry.base_url())
    }

    /// Talk to `base_url` instead of the registry's `protocol://host:port`.
    pub fn with_base_url(entry: &RegistryEntry, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cluster: entry.cluster.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            server_host: entry.hostname.clone(),
        }
    }

    fn cluster_url(&self, path: &str) -> String {
        format!("{}/api/v1/clusters/{}{}", self.base_url, self.cluster, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Requested-By", REQUESTED_BY)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!(url = %url, ?query, "GET");
        let response = self
            .authorized(self.http.get(url).query(query))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    async fn put_json(&self, url: &str, query: &[(&str, &str)], body: &Value) -> Result<()> {
        debug!(url = %url, ?query, "PUT");
        self.authorized(self.http.put(url).query(query))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn hosts_by_role(&self, role_field: &str, names: &[String]) -> Result<HostSet> {
        let url = self.cluster_url("/host_components");
        let mut hosts = HostSet::new();
        for name in names {
            let page: Items<HostComponentItem> = self
                .get_json(
                    &url,
                    &[(role_field, name.as_str()), ("fields", "HostRoles/host_name")],
                )
                .await?;
            hosts.extend(page.items.into_iter().map(|i| i.host_roles.host_name));
        }
        Ok(hosts)
    }

    async fn fetch_all_hosts(&self) -> Result<HostSet> {
        let page: Items<HostItem> = self
            .get_json(&self.cluster_url("/hosts"), &[("fields", "Hosts/host_name")])
            .await?;
        Ok(page.items.into_iter().map(|i| i.hosts.host_name).collect())
    }

    async fn lifecycle(&self, command: &str, target: &LifecycleTarget) -> Result<()> {
        let state = desired_state(command);
        let context = format!("{} {} via ambari-playbook", command.trim().to_uppercase(), target);

        match target {
            LifecycleTarget::Service(name) => {
                let body = json!({
                    "RequestInfo": { "context": context },
                    "Body": { "ServiceInfo": { "state": state } }
                });
                self.put_json(&self.cluster_url(&format!("/services/{name}")), &[], &body)
                    .await
            }
            LifecycleTarget::Component(name) => {
                let body = json!({
                    "RequestInfo": { "context": context },
                    "Body": { "HostRoles": { "state": state } }
                });
                self.put_json(
                    &self.cluster_url("/host_components"),
                    &[("HostRoles/component_name", name.as_str())],
                    &body,
                )
                .await
            }
        }
    }

    async fn set_property(&self, config_type: &str, key: &str, value: &str) -> Result<()> {
        let cluster: ClusterItem = self
            .get_json(&self.cluster_url(""), &[("fields", "Clusters/desired_configs")])
            .await?;

        let tag = cluster
            .clusters
            .desired_configs
            .get(config_type)
            .map(|t| t.tag.clone())
            .ok_or_else(|| {
                PlaybookError::ControlPlane(format!(
                    "config type '{config_type}' does not exist in cluster '{}'",
                    self.cluster
                ))
            })?;

        let current: Items<ConfigurationItem> = self
            .get_json(
                &self.cluster_url("/configurations"),
                &[("type", config_type), ("tag", tag.as_str())],
            )
            .await?;

        let mut properties = current
            .items
            .into_iter()
            .next()
            .map(|i| i.properties)
            .unwrap_or_default();
        properties.insert(key.to_string(), Value::String(value.to_string()));

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let body = json!({
            "Clusters": {
                "desired_config": {
                    "type": config_type,
                    "tag": format!("version{millis}"),
                    "properties": properties,
                }
            }
        });

        debug!(config_type = %config_type, previous_tag = %tag, "writing new config version");
        self.put_json(&self.cluster_url(""), &[], &body).await
    }
}

fn topology_error(err: PlaybookError) -> PlaybookError {
    match err {
        PlaybookError::Topology(_) => err,
        other => PlaybookError::Topology(other.to_string()),
    }
}

fn control_plane_error(err: PlaybookError) -> PlaybookError {
    match err {
        PlaybookError::ControlPlane(_) => err,
        other => PlaybookError::ControlPlane(other.to_string()),
    }
}

impl Topology for AmbariClient {
    fn list_hosts<'a>(
        &'a self,
        services: Option<&'a [String]>,
        components: Option<&'a [String]>,
    ) -> BoxFuture<'a, Result<HostSet>> {
        Box::pin(async move {
            let result = match (components, services) {
                (Some(components), _) => {
                    self.hosts_by_role("HostRoles/component_name", components)
                        .await
                }
                (None, Some(services)) => {
                    self.hosts_by_role("HostRoles/service_name", services).await
                }
                (None, None) => self.fetch_all_hosts().await,
            };
            result.map_err(topology_error)
        })
    }

    fn list_all_hosts(&self) -> BoxFuture<'_, Result<HostSet>> {
        Box::pin(async move { self.fetch_all_hosts().await.map_err(topology_error) })
    }

    fn control_plane_host(&self) -> BoxFuture<'_, Result<HostName>> {
        Box::pin(async move { Ok(self.server_host.clone()) })
    }
}

impl ControlPlane for AmbariClient {
    fn send_lifecycle_command<'a>(
        &'a self,
        command: &'a str,
        target: &'a LifecycleTarget,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.lifecycle(command, target)
                .await
                .map_err(control_plane_error)
        })
    }

    fn update_config<'a>(
        &'a self,
        config_type: &'a str,
        config_key: &'a str,
        config_value: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.set_property(config_type, config_key, config_value)
                .await
                .map_err(control_plane_error)
        })
    }
}
