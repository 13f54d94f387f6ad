//! Error types for pricemon-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Quote feed error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    #[error("No tokio runtime available to drive the feed")]
    NoRuntime,

    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
