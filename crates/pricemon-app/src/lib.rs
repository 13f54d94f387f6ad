//! Live bid/ask price monitor.
//!
//! Wires the random-walk feed into the instrument coordinator and drives
//! it from a line-oriented command prompt:
//! - Manual order entry and validation
//! - Refresh period, feed and test mode control
//! - Periodic table or JSON rendering of instrument state

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod order_entry;

pub use app::{Application, CommandOutcome};
pub use config::{AppConfig, DisplayFormat};
pub use error::{AppError, AppResult};
pub use order_entry::{parse_command, Command, EntryError};
