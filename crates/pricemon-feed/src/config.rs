//! Random-walk feed configuration.

use pricemon_core::{FeedError, FeedResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Highest price the walk may reach. Keeps every step and spread finite.
pub const MAX_PRICE: f64 = 1e12;

/// Random-walk feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomWalkConfig {
    /// Number of instruments quotes are generated for.
    #[serde(default = "default_instrument_count")]
    pub instrument_count: usize,
    /// Interval between two published quotes (ms). Default: 5.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Initial mid price of every instrument. Default: 100.0.
    #[serde(default = "default_start_price")]
    pub start_price: f64,
    /// Largest mid price move per quote. Default: 0.05.
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// Bid/ask spread around the mid. Default: 0.05.
    #[serde(default = "default_spread")]
    pub spread: f64,
    /// Largest quoted quantity. Default: 500.
    #[serde(default = "default_max_qty")]
    pub max_qty: u64,
    /// RNG seed. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_instrument_count() -> usize {
    10
}

fn default_tick_interval_ms() -> u64 {
    5
}

fn default_start_price() -> f64 {
    100.0
}

fn default_max_step() -> f64 {
    0.05
}

fn default_spread() -> f64 {
    0.05
}

fn default_max_qty() -> u64 {
    500
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            instrument_count: default_instrument_count(),
            tick_interval_ms: default_tick_interval_ms(),
            start_price: default_start_price(),
            max_step: default_max_step(),
            spread: default_spread(),
            max_qty: default_max_qty(),
            seed: None,
        }
    }
}

impl RandomWalkConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the configuration can drive a walk.
    pub fn validate(&self) -> FeedResult<()> {
        if self.instrument_count == 0 {
            return Err(FeedError::InvalidConfig(
                "instrument_count must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(FeedError::InvalidConfig(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        if !(self.start_price > 0.0 && self.start_price <= MAX_PRICE) {
            return Err(FeedError::InvalidConfig(format!(
                "start_price must be in (0, {MAX_PRICE}], got {}",
                self.start_price
            )));
        }
        if !(self.max_step >= 0.0 && self.max_step <= self.start_price) {
            return Err(FeedError::InvalidConfig(format!(
                "max_step must be in [0, start_price], got {}",
                self.max_step
            )));
        }
        if !(self.spread >= 0.0 && self.spread <= self.start_price) {
            return Err(FeedError::InvalidConfig(format!(
                "spread must be in [0, start_price], got {}",
                self.spread
            )));
        }
        if self.max_qty == 0 {
            return Err(FeedError::InvalidConfig(
                "max_qty must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
