//! Monitor error types.

use pricemon_core::{CoreError, FeedError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Instrument count must be at least 1")]
    InvalidCount,

    #[error("Instrument index {index} out of range [0, {count})")]
    OutOfRangeIndex { index: usize, count: usize },

    #[error(transparent)]
    InvalidOrder(#[from] CoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
