//! Prometheus metrics for the price monitor.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught at first use.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_gauge, register_int_counter_vec, register_int_gauge, Encoder, Gauge, IntCounterVec,
    IntGauge, TextEncoder,
};

/// Quote dispatch outcomes.
/// Labels: outcome (accepted/throttled/dropped)
pub static QUOTES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricemon_quotes_total",
        "Quote events by dispatch outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Manual order outcomes.
/// Labels: outcome (applied/rejected)
pub static ORDERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pricemon_orders_total",
        "Manual orders by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Current refresh period in milliseconds.
pub static REFRESH_PERIOD_MS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "pricemon_refresh_period_ms",
        "Minimum interval between accepted feed updates per instrument"
    )
    .unwrap()
});

/// Quote feed state (1 = running).
pub static FEED_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("pricemon_feed_running", "Quote feed state (1=running)").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn quote_accepted() {
        QUOTES_TOTAL.with_label_values(&["accepted"]).inc();
    }

    pub fn quote_throttled() {
        QUOTES_TOTAL.with_label_values(&["throttled"]).inc();
    }

    /// Record a quote dropped before reaching an instrument
    /// (bad index, lagging receiver, feed stopped).
    pub fn quotes_dropped(count: u64) {
        QUOTES_TOTAL.with_label_values(&["dropped"]).inc_by(count);
    }

    pub fn order_applied() {
        ORDERS_TOTAL.with_label_values(&["applied"]).inc();
    }

    pub fn order_rejected() {
        ORDERS_TOTAL.with_label_values(&["rejected"]).inc();
    }

    pub fn refresh_period_set(period_ms: f64) {
        REFRESH_PERIOD_MS.set(period_ms);
    }

    pub fn feed_running(running: bool) {
        FEED_RUNNING.set(i64::from(running));
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
