// tests/host_filter.rs

mod common;
use crate::common::{hdfs_topology, init_tracing};

use ambari_playbook::filter::HostFilter;
use ambari_playbook_test_utils::builders::hosts;
use ambari_playbook_test_utils::fakes::{FakeTopology, TopologyCall};
use proptest::prelude::*;

#[tokio::test]
async fn control_plane_flag_wins_over_everything() {
    init_tracing();
    let topology = hdfs_topology();
    let filter = HostFilter::new(Some("HDFS"), Some("DATANODE"), Some("x.test"), true);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(resolved, hosts(&["ambari.test"]));
    assert_eq!(topology.calls(), vec![TopologyCall::ControlPlaneHost]);
}

#[tokio::test]
async fn components_win_over_services() {
    init_tracing();
    let topology = hdfs_topology();
    let filter = HostFilter::new(Some("YARN"), Some("DATANODE"), None, false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(resolved, hosts(&["dn1.test", "dn2.test"]));
    assert_eq!(
        topology.calls(),
        vec![TopologyCall::ByComponents(vec!["DATANODE".to_string()])]
    );
}

#[tokio::test]
async fn services_are_unioned() {
    let topology = hdfs_topology();
    let filter = HostFilter::new(Some("HDFS, YARN"), None, None, false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(
        resolved,
        hosts(&["dn1.test", "dn2.test", "nn1.test", "rm1.test"])
    );
}

#[tokio::test]
async fn explicit_hosts_are_used_verbatim() {
    let topology = hdfs_topology();
    let filter = HostFilter::new(None, None, Some("a.test, b.test,,a.test"), false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(resolved, hosts(&["a.test", "b.test"]));
    assert!(topology.calls().is_empty(), "no topology lookup for explicit hosts");
}

#[tokio::test]
async fn explicit_hosts_lose_to_services() {
    let topology = hdfs_topology();
    let filter = HostFilter::new(Some("YARN"), None, Some("a.test"), false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(resolved, hosts(&["rm1.test"]));
}

#[tokio::test]
async fn no_filter_means_every_host() {
    let topology = hdfs_topology();
    let filter = HostFilter::new(None, None, None, false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(resolved.len(), 5);
    assert!(resolved.contains("ambari.test"));
    assert_eq!(topology.calls(), vec![TopologyCall::All]);
}

#[tokio::test]
async fn blank_filters_count_as_absent() {
    let topology = hdfs_topology();
    let filter = HostFilter::new(Some(" , "), Some(""), None, false);

    let resolved = filter.resolve(&topology).await.unwrap();

    assert_eq!(topology.calls(), vec![TopologyCall::All]);
    assert_eq!(resolved.len(), 5);
}

proptest! {
    #[test]
    fn component_filter_always_beats_service_filter(
        service_hosts in proptest::collection::btree_set("[a-z]{1,6}\\.svc", 0..5),
        component_hosts in proptest::collection::btree_set("[a-z]{1,6}\\.cmp", 0..5),
        explicit in proptest::option::of("[a-z]{1,6}\\.x"),
    ) {
        let svc: Vec<&str> = service_hosts.iter().map(String::as_str).collect();
        let cmp: Vec<&str> = component_hosts.iter().map(String::as_str).collect();
        let topology = FakeTopology::new("ambari.test")
            .service("SVC", &svc)
            .component("CMP", &cmp);
        let filter = HostFilter::new(Some("SVC"), Some("CMP"), explicit.as_deref(), false);

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let resolved = rt.block_on(filter.resolve(&topology)).unwrap();

        prop_assert_eq!(resolved, component_hosts);
    }
}
