//! Common test utilities for integration tests

use std::future::Future;
use std::time::{Duration, Instant};

use objective_sync::Config;

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll an async predicate every 10ms until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(timeout: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate().await
}

/// Config with fast periods for scheduler tests.
#[allow(dead_code)]
pub fn fast_config(representations: &[&str]) -> Config {
    let mut config = Config::default();
    config.sync.full_sync_interval_secs = 1;
    config.sync.poll_interval_ms = 20;
    config.instances.representations = representations.iter().map(|s| (*s).to_string()).collect();
    config
}

#[allow(dead_code)]
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}
