//! Shared fixtures for integration tests.

use pricemon_app::{AppConfig, Application};
use pricemon_feed::RandomWalkConfig;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Small, fast, deterministic configuration.
pub fn test_config(instrument_count: usize, refresh_period_ms: u64) -> AppConfig {
    AppConfig {
        instrument_count,
        refresh_period_ms,
        autostart_feed: false,
        display_interval_ms: 0,
        feed: RandomWalkConfig {
            tick_interval_ms: 1,
            seed: Some(7),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn test_app(instrument_count: usize, refresh_period_ms: u64) -> Application {
    Application::new(test_config(instrument_count, refresh_period_ms)).expect("valid config")
}

/// Poll `cond` until true or two seconds pass.
pub async fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
    timeout(Duration::from_secs(2), async {
        while !cond() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
