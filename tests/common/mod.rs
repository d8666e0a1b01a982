#![allow(dead_code)]

use std::sync::Arc;

use ambari_playbook::config::RegistryConfig;
use ambari_playbook::engine::PlaybookRunner;
use ambari_playbook_test_utils::fakes::{
    FakeControlPlane, FakeLocalBackend, FakeTopology, FakeTransport,
};

pub use ambari_playbook_test_utils::{init_tracing, with_timeout};

/// All fakes wired into one runner; keep the `Arc`s to inspect calls.
pub struct Harness {
    pub topology: Arc<FakeTopology>,
    pub transport: Arc<FakeTransport>,
    pub local: Arc<FakeLocalBackend>,
    pub control_plane: Arc<FakeControlPlane>,
    pub runner: PlaybookRunner,
}

impl Harness {
    pub fn new(
        config: &RegistryConfig,
        topology: FakeTopology,
        transport: FakeTransport,
        local: FakeLocalBackend,
        control_plane: FakeControlPlane,
    ) -> Self {
        let topology = Arc::new(topology);
        let transport = Arc::new(transport);
        let local = Arc::new(local);
        let control_plane = Arc::new(control_plane);

        let runner = PlaybookRunner::new(
            config,
            topology.clone(),
            transport.clone(),
            local.clone(),
            control_plane.clone(),
        );

        Self {
            topology,
            transport,
            local,
            control_plane,
            runner,
        }
    }

    pub fn with_topology(config: &RegistryConfig, topology: FakeTopology) -> Self {
        Self::new(
            config,
            topology,
            FakeTransport::new(),
            FakeLocalBackend::new(),
            FakeControlPlane::new(),
        )
    }
}

/// Small HDFS cluster: one server, two DataNodes, one NameNode, plus YARN.
pub fn hdfs_topology() -> FakeTopology {
    FakeTopology::new("ambari.test")
        .service("HDFS", &["nn1.test", "dn1.test", "dn2.test"])
        .component("NAMENODE", &["nn1.test"])
        .component("DATANODE", &["dn1.test", "dn2.test"])
        .service("YARN", &["rm1.test"])
        .component("RESOURCEMANAGER", &["rm1.test"])
}
