//! Application configuration.

use crate::error::{AppError, AppResult};
use pricemon_feed::RandomWalkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the periodic instrument view is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    Table,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Number of tracked instruments. Default: 10.
    #[serde(default = "default_instrument_count")]
    pub instrument_count: usize,
    /// Minimum interval between accepted feed quotes per instrument (ms).
    /// Default: 150.
    #[serde(default = "default_refresh_period_ms")]
    pub refresh_period_ms: u64,
    /// Start in test mode (feed paused, state zeroed). Default: false.
    #[serde(default)]
    pub test_mode: bool,
    /// Start the feed at launch. Default: true.
    #[serde(default = "default_autostart_feed")]
    pub autostart_feed: bool,
    /// Interval between two rendered views (ms). 0 disables. Default: 1000.
    #[serde(default = "default_display_interval_ms")]
    pub display_interval_ms: u64,
    #[serde(default)]
    pub display_format: DisplayFormat,
    /// Random-walk feed settings. Its `instrument_count` is always replaced
    /// by the top-level value.
    #[serde(default)]
    pub feed: RandomWalkConfig,
}

fn default_instrument_count() -> usize {
    10
}

fn default_refresh_period_ms() -> u64 {
    150
}

fn default_autostart_feed() -> bool {
    true
}

fn default_display_interval_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument_count: default_instrument_count(),
            refresh_period_ms: default_refresh_period_ms(),
            test_mode: false,
            autostart_feed: default_autostart_feed(),
            display_interval_ms: default_display_interval_ms(),
            display_format: DisplayFormat::default(),
            feed: RandomWalkConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.instrument_count == 0 {
            return Err(AppError::Config(
                "instrument_count must be at least 1".to_string(),
            ));
        }
        self.feed_config()
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms)
    }

    /// Rendering interval, `None` when disabled.
    pub fn display_interval(&self) -> Option<Duration> {
        (self.display_interval_ms > 0).then(|| Duration::from_millis(self.display_interval_ms))
    }

    /// Feed settings aligned with the instrument count.
    pub fn feed_config(&self) -> RandomWalkConfig {
        RandomWalkConfig {
            instrument_count: self.instrument_count,
            ..self.feed.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.instrument_count, 10);
        assert_eq!(config.refresh_period(), Duration::from_millis(150));
        assert!(!config.test_mode);
        assert!(config.autostart_feed);
        assert_eq!(config.display_interval(), Some(Duration::from_secs(1)));
        assert_eq!(config.display_format, DisplayFormat::Table);
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml(
            r#"
            instrument_count = 4
            refresh_period_ms = 100
            test_mode = true
            autostart_feed = false
            display_interval_ms = 0
            display_format = "json"

            [feed]
            instrument_count = 99
            tick_interval_ms = 2
            seed = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.instrument_count, 4);
        assert!(config.test_mode);
        assert!(config.display_interval().is_none());
        assert_eq!(config.display_format, DisplayFormat::Json);

        let feed = config.feed_config();
        assert_eq!(feed.instrument_count, 4);
        assert_eq!(feed.tick_interval_ms, 2);
        assert_eq!(feed.seed, Some(5));
    }

    #[test]
    fn test_zero_instruments_rejected() {
        let result = AppConfig::from_toml("instrument_count = 0");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_feed_rejected() {
        let result = AppConfig::from_toml("[feed]\ntick_interval_ms = 0");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file("/nonexistent/pricemon.toml");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
