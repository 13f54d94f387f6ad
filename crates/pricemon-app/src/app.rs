//! Main application orchestration.
//!
//! Coordinates:
//! - The random-walk quote feed
//! - The instrument coordinator
//! - Periodic rendering of instrument state
//! - The command prompt on stdin

use crate::config::{AppConfig, DisplayFormat};
use crate::display::{format_period, render_json, render_table};
use crate::error::AppResult;
use crate::order_entry::{parse_command, Command, HELP};
use pricemon_core::InstrumentId;
use pricemon_feed::RandomWalkFeed;
use pricemon_monitor::Coordinator;
use pricemon_telemetry::Metrics;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Text to show the user.
    Reply(String),
    /// The user asked to leave.
    Quit,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    coordinator: Arc<Coordinator>,
}

impl Application {
    /// Build the feed and coordinator from configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let feed = Arc::new(RandomWalkFeed::new(config.feed_config())?);
        let coordinator = Arc::new(Coordinator::new(
            config.instrument_count,
            config.refresh_period(),
            feed,
        )?);

        Ok(Self {
            config,
            coordinator,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Run against stdin until the user quits, stdin closes, or Ctrl-C.
    pub async fn run(&self) -> AppResult<()> {
        self.run_with_input(BufReader::new(tokio::io::stdin())).await
    }

    /// Run against any line source. The session ends at end of input.
    pub async fn run_with_input<R>(&self, input: R) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        if self.config.test_mode {
            self.coordinator.set_test_mode(true);
        }
        if self.config.autostart_feed {
            self.coordinator.start_feed()?;
        }

        let display = self.config.display_interval().map(|interval| {
            tokio::spawn(run_display(
                self.coordinator.clone(),
                interval,
                self.config.display_format,
            ))
        });
        let updates = tokio::spawn(log_updates(self.coordinator.clone()));

        println!("{HELP}");
        let mut lines = input.lines();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down");
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if self.handle_line(&line) == CommandOutcome::Quit {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Input closed, shutting down");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read input, shutting down");
                        break;
                    }
                },
            }
        }

        self.coordinator.stop_feed();
        if let Some(display) = display {
            display.abort();
        }
        updates.abort();
        info!(stats = ?self.coordinator.stats(), "Price monitor stopped");
        Ok(())
    }

    /// Parse and execute one prompt line, printing the reply.
    fn handle_line(&self, line: &str) -> CommandOutcome {
        let outcome = match parse_command(line, self.coordinator.len()) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => return CommandOutcome::Reply(String::new()),
            Err(e) => CommandOutcome::Reply(e.to_string()),
        };
        if let CommandOutcome::Reply(text) = &outcome {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        outcome
    }

    /// Execute one command against the coordinator.
    pub fn handle_command(&self, command: Command) -> CommandOutcome {
        let c = &self.coordinator;
        let reply = match command {
            Command::Order { index, order } => match c.apply_order(index, &order) {
                Ok(()) => format!("{} <- {order}", InstrumentId::new(index).label()),
                Err(e) => e.to_string(),
            },
            Command::Period(period) => {
                c.set_refresh_period(period);
                format!("refresh period: {}", format_period(period))
            }
            Command::Start => match c.start_feed() {
                Ok(true) => "feed started".to_string(),
                Ok(false) if c.is_test_mode() => "test mode active, feed not started".to_string(),
                Ok(false) => "feed already running".to_string(),
                Err(e) => e.to_string(),
            },
            Command::Stop => {
                if c.stop_feed() {
                    "feed stopped".to_string()
                } else {
                    "feed not running".to_string()
                }
            }
            Command::TestMode(enabled) => {
                c.set_test_mode(enabled);
                if enabled {
                    "test mode on, feed stopped".to_string()
                } else {
                    "test mode off".to_string()
                }
            }
            Command::Reset => {
                c.reset_all();
                "all instruments reset".to_string()
            }
            Command::Show(index) => {
                let snapshots = match index {
                    Some(i) => c.snapshot(i).map(|s| vec![s]).unwrap_or_default(),
                    None => c.snapshots(),
                };
                render_table(&snapshots, c.refresh_period())
            }
            Command::Stats => {
                let s = c.stats();
                format!(
                    "quotes accepted={} throttled={} dropped={} | orders applied={} rejected={} | feed={}",
                    s.quotes_accepted,
                    s.quotes_throttled,
                    s.quotes_dropped,
                    s.orders_applied,
                    s.orders_rejected,
                    if c.is_feed_running() { "running" } else { "stopped" },
                )
            }
            Command::Metrics => Metrics::encode().unwrap_or_else(|e| e.to_string()),
            Command::Help => HELP.to_string(),
            Command::Quit => return CommandOutcome::Quit,
        };
        CommandOutcome::Reply(reply)
    }
}

async fn run_display(
    coordinator: Arc<Coordinator>,
    interval: std::time::Duration,
    format: DisplayFormat,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let snapshots = coordinator.snapshots();
        match format {
            DisplayFormat::Table => {
                println!("{}", render_table(&snapshots, coordinator.refresh_period()))
            }
            DisplayFormat::Json => match render_json(&snapshots) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "Failed to render snapshot"),
            },
        }
    }
}

async fn log_updates(coordinator: Arc<Coordinator>) {
    let mut rx = coordinator.subscribe();
    loop {
        match rx.recv().await {
            Ok(update) => debug!(
                instrument = %update.instrument,
                source = ?update.source,
                changed = ?update.changed,
                "Instrument updated"
            ),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "Update log lagging"),
            Err(RecvError::Closed) => break,
        }
    }
}
