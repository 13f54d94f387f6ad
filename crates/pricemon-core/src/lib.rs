//! Core domain types for the price monitor.
//!
//! This crate provides the value types shared by every other crate:
//! - `InstrumentId`: Stable index of a tracked instrument
//! - `Quote`, `QuoteEvent`: Full bid/ask/volume snapshots published by a feed
//! - `Order`, `OrderSide`: Manually entered trade intents
//! - `DeltaSign`, `Field`: Change signals consumed by observers
//! - `QuoteFeed`: The contract every quote source implements

pub mod error;
pub mod feed;
pub mod order;
pub mod types;

pub use error::{CoreError, FeedError, FeedResult, Result};
pub use feed::QuoteFeed;
pub use order::{Order, OrderSide};
pub use types::{DeltaSign, Field, InstrumentId, Quote, QuoteEvent};
