//! Random-walk quote generator.

use crate::config::{RandomWalkConfig, MAX_PRICE};
use pricemon_core::{InstrumentId, Quote, QuoteEvent};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Lowest mid price the walk may reach.
const MIN_MID: f64 = 0.01;

/// Per-instrument walk state.
#[derive(Debug, Clone, Copy)]
struct WalkState {
    mid: f64,
    volume: u64,
}

/// Generates one quote at a time for a randomly chosen instrument.
pub struct RandomWalk {
    rng: SmallRng,
    states: Vec<WalkState>,
    max_step: f64,
    half_spread: f64,
    max_qty: u64,
}

impl RandomWalk {
    pub fn new(config: &RandomWalkConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let states = vec![
            WalkState {
                mid: config.start_price,
                volume: 0,
            };
            config.instrument_count.max(1)
        ];

        Self {
            rng,
            states,
            max_step: config.max_step,
            half_spread: config.spread / 2.0,
            max_qty: config.max_qty.max(1),
        }
    }

    /// Advance one instrument and return its new snapshot.
    pub fn next_event(&mut self) -> QuoteEvent {
        let index = self.rng.gen_range(0..self.states.len());
        let step = if self.max_step > 0.0 {
            self.rng.gen_range(-self.max_step..=self.max_step)
        } else {
            0.0
        };
        let bid_qty = self.rng.gen_range(1..=self.max_qty);
        let ask_qty = self.rng.gen_range(1..=self.max_qty);
        let traded = self.rng.gen_range(0..=self.max_qty);

        let state = &mut self.states[index];
        state.mid = round_cents((state.mid + step).clamp(MIN_MID, MAX_PRICE));
        state.volume = state.volume.saturating_add(traded);

        let bid = round_cents((state.mid - self.half_spread).max(0.0));
        let ask = round_cents(state.mid + self.half_spread);

        QuoteEvent::new(
            InstrumentId::new(index),
            Quote::new(bid, bid_qty, ask, ask_qty, state.volume),
        )
    }
}

fn round_cents(px: f64) -> f64 {
    (px * 100.0).round() / 100.0
}
