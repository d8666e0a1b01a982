pub mod builders;
pub mod fakes;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Default filter: engine events at `debug`, everything else (reqwest,
/// hyper, wiremock) at `warn`.
const DEFAULT_TEST_FILTER: &str = "ambari_playbook=debug,warn";

/// Initialise tracing for tests, once per test binary.
///
/// Output goes through `with_test_writer()`, so the harness shows it only for
/// failing tests. Override the filter with `RUST_LOG`, e.g.
/// `RUST_LOG=ambari_playbook::exec=trace`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout, so a stuck fan-out fails the test
/// instead of hanging it.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
