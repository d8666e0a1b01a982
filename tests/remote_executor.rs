// tests/remote_executor.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ambari_playbook::errors::PlaybookError;
use ambari_playbook::exec::RemoteExecutor;
use ambari_playbook::types::HostSet;
use ambari_playbook_test_utils::builders::{hosts, RegistryConfigBuilder};
use ambari_playbook_test_utils::fakes::{FakeTransport, TransportCall};

fn executor(transport: &Arc<FakeTransport>, config: RegistryConfigBuilder) -> RemoteExecutor {
    RemoteExecutor::new(transport.clone(), &config.build())
}

#[tokio::test]
async fn one_result_per_host() {
    init_tracing();
    let transport = Arc::new(FakeTransport::new());
    let remote = executor(&transport, RegistryConfigBuilder::new());
    let targets = hosts(&["a.test", "b.test", "c.test"]);

    let results = with_timeout(remote.run_remote("uptime", &targets, false))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.keys().cloned().collect::<Vec<_>>(), vec!["a.test", "b.test", "c.test"]);
    assert_eq!(results["b.test"].stdout, "uptime on b.test");
    assert!(results.values().all(|r| r.done));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn empty_host_set_returns_empty_map() {
    let transport = Arc::new(FakeTransport::new());
    let remote = executor(&transport, RegistryConfigBuilder::new());

    let results = remote.run_remote("uptime", &hosts(&[]), false).await.unwrap();

    assert!(results.is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn missing_connection_profile_fails_before_any_session() {
    let transport = Arc::new(FakeTransport::new());
    let remote = executor(
        &transport,
        RegistryConfigBuilder::new().without_connection_profile(),
    );

    let err = remote
        .run_remote("uptime", &hosts(&["a.test"]), false)
        .await
        .unwrap_err();

    match err {
        PlaybookError::MissingConnectionProfile { registry } => assert_eq!(registry, "test"),
        other => panic!("expected MissingConnectionProfile, got {other:?}"),
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn missing_connection_profile_fails_even_for_empty_host_set() {
    let transport = Arc::new(FakeTransport::new());
    let remote = executor(
        &transport,
        RegistryConfigBuilder::new().without_connection_profile(),
    );

    let result = remote.run_remote("uptime", &hosts(&[]), false).await;

    assert!(matches!(
        result,
        Err(PlaybookError::MissingConnectionProfile { .. })
    ));
}

#[tokio::test]
async fn unreachable_host_fails_after_every_host_was_tried() {
    init_tracing();
    let transport = Arc::new(FakeTransport::new().unreachable("b.test"));
    let remote = executor(&transport, RegistryConfigBuilder::new());
    let targets = hosts(&["a.test", "b.test", "c.test"]);

    let err = with_timeout(remote.run_remote("uptime", &targets, false))
        .await
        .unwrap_err();

    match err {
        PlaybookError::Transport { host, message } => {
            assert_eq!(host, "b.test");
            assert_eq!(message, "connection refused");
        }
        other => panic!("expected Transport error, got {other:?}"),
    }
    assert_eq!(transport.calls().len(), 3, "barrier waits for every host");
}

#[tokio::test]
async fn several_unreachable_hosts_are_all_named() {
    let transport = Arc::new(
        FakeTransport::new()
            .unreachable("a.test")
            .unreachable("c.test"),
    );
    let remote = executor(&transport, RegistryConfigBuilder::new());

    let err = remote
        .run_remote("uptime", &hosts(&["a.test", "b.test", "c.test"]), false)
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("a.test") || text.contains("c.test"));
    assert!(text.contains("also failed"), "{text}");
}

#[tokio::test]
async fn non_zero_exit_is_reported_not_raised() {
    let transport = Arc::new(FakeTransport::new().exit_code("a.test", 3));
    let remote = executor(&transport, RegistryConfigBuilder::new());

    let results = remote
        .run_remote("false", &hosts(&["a.test", "b.test"]), false)
        .await
        .unwrap();

    assert!(!results["a.test"].done);
    assert_eq!(results["a.test"].exit_code, Some(3));
    assert!(results["b.test"].done);
}

#[tokio::test]
async fn concurrency_is_capped_by_max_parallel_hosts() {
    let transport = Arc::new(FakeTransport::new().delay(Duration::from_millis(50)));
    let remote = executor(&transport, RegistryConfigBuilder::new().max_parallel_hosts(2));
    let names: Vec<String> = (0..6).map(|i| format!("h{i}.test")).collect();
    let targets: HostSet = names.iter().cloned().collect();

    let results = with_timeout(remote.run_remote("uptime", &targets, false))
        .await
        .unwrap();

    assert_eq!(results.len(), 6);
    let peak = transport.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 2, "peak concurrency was {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn hosts_run_concurrently() {
    let transport = Arc::new(FakeTransport::new().delay(Duration::from_millis(50)));
    let remote = executor(&transport, RegistryConfigBuilder::new());
    let targets = hosts(&["a.test", "b.test", "c.test", "d.test"]);

    with_timeout(remote.run_remote("uptime", &targets, false))
        .await
        .unwrap();

    assert!(transport.max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn upload_copies_to_every_host() {
    let transport = Arc::new(FakeTransport::new());
    let remote = executor(&transport, RegistryConfigBuilder::new());

    let results = remote
        .upload(
            Path::new("/tmp/hdfs-site.xml"),
            "/etc/hadoop/conf/hdfs-site.xml",
            &hosts(&["a.test", "b.test"]),
            false,
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    let mut calls = transport.calls();
    calls.sort_by(|a, b| a.host().cmp(b.host()));
    assert_eq!(
        calls[0],
        TransportCall::Copy {
            host: "a.test".to_string(),
            source: "/tmp/hdfs-site.xml".into(),
            target: "/etc/hadoop/conf/hdfs-site.xml".to_string(),
        }
    );
}

proptest::proptest! {
    #[test]
    fn result_count_matches_host_count(n in 0usize..24) {
        let transport = Arc::new(FakeTransport::new());
        let remote = executor(&transport, RegistryConfigBuilder::new().max_parallel_hosts(4));
        let targets: HostSet = (0..n).map(|i| format!("h{i}.test")).collect();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let results = rt.block_on(remote.run_remote("uptime", &targets, false)).unwrap();

        proptest::prop_assert_eq!(results.len(), n);
        proptest::prop_assert_eq!(transport.calls().len(), n);
    }
}
