//! Prometheus metrics and structured logging for the price monitor.
//!
//! - Quote/order dispatch counters
//! - Feed and refresh policy gauges
//! - Structured JSON or pretty logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
