//! Market data value types.
//!
//! Contains the instrument identifier, the quote snapshot published by a
//! feed, and the change signals (`DeltaSign`, `Field`) that observers use to
//! render an instrument.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of an instrument, in `[0, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(usize);

impl InstrumentId {
    /// Create a new instrument ID.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index.
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Display label derived from the index.
    pub fn label(&self) -> String {
        format!("Instrument {}", self.0)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for InstrumentId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Full market snapshot for one instrument as published by a feed.
///
/// A quote replaces every field of the instrument it targets; it is never
/// applied as a delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub bid_price: f64,
    /// Best bid quantity.
    pub bid_qty: u64,
    /// Best ask price.
    pub ask_price: f64,
    /// Best ask quantity.
    pub ask_qty: u64,
    /// Cumulative traded volume.
    pub volume: u64,
}

impl Quote {
    /// Create a new quote.
    pub fn new(bid_price: f64, bid_qty: u64, ask_price: f64, ask_qty: u64, volume: u64) -> Self {
        Self {
            bid_price,
            bid_qty,
            ask_price,
            ask_qty,
            volume,
        }
    }
}

/// A quote addressed to one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteEvent {
    pub instrument: InstrumentId,
    pub quote: Quote,
}

impl QuoteEvent {
    pub fn new(instrument: InstrumentId, quote: Quote) -> Self {
        Self { instrument, quote }
    }
}

/// Direction of the most recent change of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaSign {
    Down,
    #[default]
    Flat,
    Up,
}

impl DeltaSign {
    /// Sign of `new - old`.
    ///
    /// `Flat` if and only if the prices compare equal.
    pub fn between(old: f64, new: f64) -> Self {
        if new > old {
            Self::Up
        } else if new < old {
            Self::Down
        } else {
            Self::Flat
        }
    }

    /// Returns 1, 0 or -1.
    pub fn as_i8(&self) -> i8 {
        match self {
            Self::Down => -1,
            Self::Flat => 0,
            Self::Up => 1,
        }
    }
}

impl fmt::Display for DeltaSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Observable instrument field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    BidPrice,
    BidQty,
    AskPrice,
    AskQty,
    Volume,
    DeltaBid,
    DeltaAsk,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BidPrice => "bid_price",
            Self::BidQty => "bid_qty",
            Self::AskPrice => "ask_price",
            Self::AskQty => "ask_qty",
            Self::Volume => "volume",
            Self::DeltaBid => "delta_bid",
            Self::DeltaAsk => "delta_ask",
        };
        write!(f, "{name}")
    }
}
