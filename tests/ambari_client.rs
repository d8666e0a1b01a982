// tests/ambari_client.rs

use ambari_playbook::control_plane::client::desired_state;
use ambari_playbook::control_plane::{AmbariClient, ControlPlane};
use ambari_playbook::errors::PlaybookError;
use ambari_playbook::topology::Topology;
use ambari_playbook::types::LifecycleTarget;
use ambari_playbook_test_utils::builders::{hosts, RegistryConfigBuilder};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AmbariClient {
    AmbariClient::with_base_url(&RegistryConfigBuilder::new().entry(), server.uri())
}

#[tokio::test]
async fn lists_all_cluster_hosts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1/hosts"))
        .and(query_param("fields", "Hosts/host_name"))
        .and(header("X-Requested-By", "ambari"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "Hosts": { "host_name": "a.test" } },
                { "Hosts": { "host_name": "b.test" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let all = client(&server).list_all_hosts().await.unwrap();

    assert_eq!(all, hosts(&["a.test", "b.test"]));
}

#[tokio::test]
async fn response_without_items_is_an_empty_host_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "href": "http://ambari.test:8080/api/v1/clusters/cl1/hosts"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1/host_components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ambari = client(&server);
    let all = ambari.list_all_hosts().await.unwrap();
    let components = vec!["ZOOKEEPER_SERVER".to_string()];
    let by_component = ambari
        .list_hosts(None, Some(components.as_slice()))
        .await
        .unwrap();

    assert!(all.is_empty());
    assert!(by_component.is_empty());
}

#[tokio::test]
async fn component_lookup_unions_every_component() {
    let server = MockServer::start().await;
    for (component, host) in [("DATANODE", "dn1.test"), ("NAMENODE", "nn1.test")] {
        Mock::given(method("GET"))
            .and(path("/api/v1/clusters/cl1/host_components"))
            .and(query_param("HostRoles/component_name", component))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [ { "HostRoles": { "host_name": host } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let components = vec!["DATANODE".to_string(), "NAMENODE".to_string()];
    let services = vec!["HDFS".to_string()];
    let found = client(&server)
        .list_hosts(Some(services.as_slice()), Some(components.as_slice()))
        .await
        .unwrap();

    assert_eq!(found, hosts(&["dn1.test", "nn1.test"]));
}

#[tokio::test]
async fn service_lookup_uses_service_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1/host_components"))
        .and(query_param("HostRoles/service_name", "YARN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "HostRoles": { "host_name": "rm1.test" } },
                { "HostRoles": { "host_name": "rm1.test" } }
            ]
        })))
        .mount(&server)
        .await;

    let services = vec!["YARN".to_string()];
    let found = client(&server)
        .list_hosts(Some(services.as_slice()), None)
        .await
        .unwrap();

    assert_eq!(found, hosts(&["rm1.test"]));
}

#[tokio::test]
async fn control_plane_host_is_the_registry_hostname() {
    let server = MockServer::start().await;
    let host = client(&server).control_plane_host().await.unwrap();
    assert_eq!(host, "ambari.test");
}

#[tokio::test]
async fn topology_http_error_is_a_topology_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).list_all_hosts().await.unwrap_err();

    assert!(matches!(err, PlaybookError::Topology(_)), "{err:?}");
}

#[tokio::test]
async fn service_lifecycle_puts_service_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/clusters/cl1/services/HDFS"))
        .and(header("X-Requested-By", "ambari"))
        .and(body_partial_json(json!({
            "Body": { "ServiceInfo": { "state": "INSTALLED" } }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_lifecycle_command("stop", &LifecycleTarget::Service("HDFS".to_string()))
        .await
        .unwrap();
}

#[tokio::test]
async fn component_lifecycle_puts_host_roles_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/clusters/cl1/host_components"))
        .and(query_param("HostRoles/component_name", "DATANODE"))
        .and(body_partial_json(json!({
            "Body": { "HostRoles": { "state": "STARTED" } }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_lifecycle_command("START", &LifecycleTarget::Component("DATANODE".to_string()))
        .await
        .unwrap();
}

#[tokio::test]
async fn lifecycle_rejection_is_a_control_plane_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_lifecycle_command("START", &LifecycleTarget::Service("HDFS".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybookError::ControlPlane(_)), "{err:?}");
}

#[tokio::test]
async fn config_update_writes_a_new_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1"))
        .and(query_param("fields", "Clusters/desired_configs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Clusters": { "desired_configs": { "hdfs-site": { "tag": "version1" } } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1/configurations"))
        .and(query_param("type", "hdfs-site"))
        .and(query_param("tag", "version1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ { "properties": { "dfs.replication": "3", "dfs.blocksize": "128m" } } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/clusters/cl1"))
        .and(body_partial_json(json!({
            "Clusters": { "desired_config": {
                "type": "hdfs-site",
                "properties": { "dfs.replication": "2", "dfs.blocksize": "128m" }
            } }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_config("hdfs-site", "dfs.replication", "2")
        .await
        .unwrap();
}

#[tokio::test]
async fn config_update_for_unknown_type_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clusters/cl1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Clusters": { "desired_configs": {} }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .update_config("nope-site", "k", "v")
        .await
        .unwrap_err();

    match err {
        PlaybookError::ControlPlane(msg) => assert!(msg.contains("nope-site"), "{msg}"),
        other => panic!("expected ControlPlane error, got {other:?}"),
    }
}

#[test]
fn lifecycle_verbs_map_to_desired_states() {
    assert_eq!(desired_state("start"), "STARTED");
    assert_eq!(desired_state("STOP"), "INSTALLED");
    assert_eq!(desired_state("install"), "INSTALLED");
    assert_eq!(desired_state("restart"), "RESTART");
}
