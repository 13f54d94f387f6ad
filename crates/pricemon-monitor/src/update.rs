//! Change notifications published to observers.

use pricemon_core::{DeltaSign, Field, InstrumentId};
use serde::Serialize;

/// Consistent read of one instrument's market and signal state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InstrumentSnapshot {
    pub id: InstrumentId,
    pub bid_price: f64,
    pub bid_qty: u64,
    pub ask_price: f64,
    pub ask_qty: u64,
    pub volume: u64,
    pub delta_bid: DeltaSign,
    pub delta_ask: DeltaSign,
}

impl InstrumentSnapshot {
    /// Zeroed state for a freshly created or reset instrument.
    pub fn zeroed(id: InstrumentId) -> Self {
        Self {
            id,
            bid_price: 0.0,
            bid_qty: 0,
            ask_price: 0.0,
            ask_qty: 0,
            volume: 0,
            delta_bid: DeltaSign::Flat,
            delta_ask: DeltaSign::Flat,
        }
    }

    /// Fields whose value differs between `self` and `other`.
    pub fn diff(&self, other: &Self) -> Vec<Field> {
        let mut changed = Vec::new();
        if self.bid_price.to_bits() != other.bid_price.to_bits() {
            changed.push(Field::BidPrice);
        }
        if self.bid_qty != other.bid_qty {
            changed.push(Field::BidQty);
        }
        if self.ask_price.to_bits() != other.ask_price.to_bits() {
            changed.push(Field::AskPrice);
        }
        if self.ask_qty != other.ask_qty {
            changed.push(Field::AskQty);
        }
        if self.volume != other.volume {
            changed.push(Field::Volume);
        }
        if self.delta_bid != other.delta_bid {
            changed.push(Field::DeltaBid);
        }
        if self.delta_ask != other.delta_ask {
            changed.push(Field::DeltaAsk);
        }
        changed
    }
}

/// What caused an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSource {
    Quote,
    Order,
    Reset,
}

/// One batch of field changes on one instrument.
///
/// `snapshot` is the full state right after the update, taken under the
/// same lock as the writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentUpdate {
    pub instrument: InstrumentId,
    pub source: UpdateSource,
    pub changed: Vec<Field>,
    pub snapshot: InstrumentSnapshot,
}

impl InstrumentUpdate {
    pub fn contains(&self, field: Field) -> bool {
        self.changed.contains(&field)
    }
}
