//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Monitor error: {0}")]
    Monitor(#[from] pricemon_monitor::MonitorError),

    #[error("Feed error: {0}")]
    Feed(#[from] pricemon_core::FeedError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] pricemon_telemetry::TelemetryError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
