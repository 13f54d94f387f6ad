//! Quote feeds for the price monitor.
//!
//! - `RandomWalkFeed`: publishes random-walk bid/ask snapshots on a
//!   background tokio task so the monitor can run without an exchange
//!   connection. The price model is intentionally naive.
//! - `ManualFeed`: publishes only what the caller hands it.

pub mod config;
pub mod manual;
pub mod random_walk;
pub mod walk;

pub use config::RandomWalkConfig;
pub use manual::ManualFeed;
pub use random_walk::RandomWalkFeed;
pub use walk::RandomWalk;
