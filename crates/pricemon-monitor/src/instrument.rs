//! Per-instrument state and update rules.
//!
//! Quote updates are throttled against the shared refresh period; order
//! updates are applied unconditionally. The throttle decision, every field
//! write, the accept timestamp and the change notification all happen under
//! one write guard.

use crate::clock::Clock;
use crate::refresh::RefreshPeriod;
use crate::update::{InstrumentSnapshot, InstrumentUpdate, UpdateSource};
use parking_lot::RwLock;
use pricemon_core::{DeltaSign, InstrumentId, Order, OrderSide, Quote};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::trace;

/// Result of offering a feed quote to an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// The quote replaced the instrument state.
    Accepted,
    /// The quote arrived inside the current refresh window and was discarded.
    Throttled,
}

#[derive(Debug)]
struct InstrumentState {
    market: InstrumentSnapshot,
    /// Monotonic time of the last accepted feed quote.
    last_accepted_at: Option<Instant>,
}

/// Mutable, continuously updated state of one tradable symbol.
pub struct Instrument {
    id: InstrumentId,
    label: String,
    refresh_period: Arc<RefreshPeriod>,
    clock: Arc<dyn Clock>,
    updates: broadcast::Sender<InstrumentUpdate>,
    state: RwLock<InstrumentState>,
}

impl Instrument {
    /// Create an instrument with zeroed state.
    pub fn new(
        id: InstrumentId,
        refresh_period: Arc<RefreshPeriod>,
        clock: Arc<dyn Clock>,
        updates: broadcast::Sender<InstrumentUpdate>,
    ) -> Self {
        Self {
            id,
            label: id.label(),
            refresh_period,
            clock,
            updates,
            state: RwLock::new(InstrumentState {
                market: InstrumentSnapshot::zeroed(id),
                last_accepted_at: None,
            }),
        }
    }

    pub fn id(&self) -> InstrumentId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current refresh period of the shared policy.
    pub fn refresh_period(&self) -> Duration {
        self.refresh_period.get()
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> InstrumentSnapshot {
        self.state.read().market
    }

    /// Time of the last accepted feed quote, if any.
    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.state.read().last_accepted_at
    }

    /// Offer a feed quote.
    ///
    /// Discarded when no more than one refresh period has elapsed since the
    /// previous accepted quote. The first quote is always accepted.
    pub fn apply_quote(&self, quote: &Quote) -> QuoteOutcome {
        let mut state = self.state.write();
        let now = self.clock.now();

        if let Some(last) = state.last_accepted_at {
            let elapsed = now.saturating_duration_since(last);
            let period = self.refresh_period.get();
            if elapsed <= period {
                trace!(
                    instrument = %self.id,
                    elapsed_us = elapsed.as_micros() as u64,
                    period_us = period.as_micros() as u64,
                    "Quote throttled"
                );
                return QuoteOutcome::Throttled;
            }
        }

        let before = state.market;
        state.market = InstrumentSnapshot {
            id: self.id,
            bid_price: quote.bid_price,
            bid_qty: quote.bid_qty,
            ask_price: quote.ask_price,
            ask_qty: quote.ask_qty,
            volume: quote.volume,
            delta_bid: DeltaSign::between(before.bid_price, quote.bid_price),
            delta_ask: DeltaSign::between(before.ask_price, quote.ask_price),
        };
        state.last_accepted_at = Some(now);

        self.publish(UpdateSource::Quote, &before, &state.market);
        QuoteOutcome::Accepted
    }

    /// Apply a manual order to one side of the quote.
    ///
    /// Never throttled and leaves the quote accept time untouched. Invalid
    /// orders are rejected before any field changes.
    pub fn apply_order(&self, order: &Order) -> pricemon_core::Result<()> {
        order.validate()?;
        let qty = order.quantity_u64();

        let mut state = self.state.write();
        let before = state.market;
        let market = &mut state.market;

        match order.side() {
            OrderSide::Ask => {
                market.delta_ask = DeltaSign::between(market.ask_price, order.price());
                market.ask_price = order.price();
                market.ask_qty = qty;
            }
            OrderSide::Bid => {
                market.delta_bid = DeltaSign::between(market.bid_price, order.price());
                market.bid_price = order.price();
                market.bid_qty = qty;
            }
        }
        market.volume = market.volume.saturating_add(qty);

        self.publish(UpdateSource::Order, &before, &state.market);
        Ok(())
    }

    /// Zero market state and both delta signals.
    ///
    /// Identity, refresh period and the quote accept time are kept.
    pub fn reset(&self) {
        let mut state = self.state.write();
        let before = state.market;
        state.market = InstrumentSnapshot::zeroed(self.id);
        self.publish(UpdateSource::Reset, &before, &state.market);
    }

    fn publish(&self, source: UpdateSource, before: &InstrumentSnapshot, after: &InstrumentSnapshot) {
        let changed = before.diff(after);
        if changed.is_empty() {
            return;
        }
        // No subscribers is a normal state.
        let _ = self.updates.send(InstrumentUpdate {
            instrument: self.id,
            source,
            changed,
            snapshot: *after,
        });
    }
}

impl std::fmt::Debug for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("refresh_period", &self.refresh_period.get())
            .field("state", &*self.state.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pricemon_core::Field;

    const PERIOD: Duration = Duration::from_millis(100);

    struct Fixture {
        clock: Arc<ManualClock>,
        period: Arc<RefreshPeriod>,
        rx: broadcast::Receiver<InstrumentUpdate>,
        instrument: Instrument,
    }

    fn fixture(index: usize) -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let period = Arc::new(RefreshPeriod::new(PERIOD));
        let (tx, rx) = broadcast::channel(64);
        let instrument = Instrument::new(
            InstrumentId::new(index),
            period.clone(),
            clock.clone(),
            tx,
        );
        Fixture {
            clock,
            period,
            rx,
            instrument,
        }
    }

    fn quote(bid: f64, ask: f64, volume: u64) -> Quote {
        Quote::new(bid, 5, ask, 5, volume)
    }

    #[test]
    fn test_new_instrument_is_zeroed() {
        let f = fixture(2);
        let snap = f.instrument.snapshot();
        assert_eq!(snap, InstrumentSnapshot::zeroed(InstrumentId::new(2)));
        assert_eq!(f.instrument.label(), "Instrument 2");
        assert!(f.instrument.last_accepted_at().is_none());
    }

    #[test]
    fn test_first_quote_always_accepted() {
        let f = fixture(0);
        assert_eq!(
            f.instrument.apply_quote(&quote(10.0, 10.05, 100)),
            QuoteOutcome::Accepted
        );
    }

    #[test]
    fn test_only_first_quote_in_window_applies() {
        let f = fixture(0);
        let first = quote(10.0, 10.05, 100);
        assert_eq!(f.instrument.apply_quote(&first), QuoteOutcome::Accepted);

        for i in 1..10u64 {
            f.clock.advance(Duration::from_millis(10));
            let later = quote(10.0 + i as f64, 11.0 + i as f64, 100 + i);
            assert_eq!(f.instrument.apply_quote(&later), QuoteOutcome::Throttled);
        }

        let snap = f.instrument.snapshot();
        assert_eq!(snap.bid_price, 10.0);
        assert_eq!(snap.ask_price, 10.05);
        assert_eq!(snap.volume, 100);
    }

    #[test]
    fn test_window_renewal() {
        let f = fixture(0);
        let eps = Duration::from_millis(1);

        assert_eq!(
            f.instrument.apply_quote(&quote(1.0, 2.0, 1)),
            QuoteOutcome::Accepted
        );

        f.clock.set_elapsed(PERIOD - eps);
        assert_eq!(
            f.instrument.apply_quote(&quote(1.5, 2.5, 2)),
            QuoteOutcome::Throttled
        );

        f.clock.set_elapsed(PERIOD + eps);
        assert_eq!(
            f.instrument.apply_quote(&quote(2.0, 3.0, 3)),
            QuoteOutcome::Accepted
        );

        // The window now runs from the second accepted quote.
        f.clock.set_elapsed(PERIOD * 2);
        assert_eq!(
            f.instrument.apply_quote(&quote(3.0, 4.0, 4)),
            QuoteOutcome::Throttled
        );
        f.clock.set_elapsed(PERIOD * 2 + eps * 2);
        assert_eq!(
            f.instrument.apply_quote(&quote(3.0, 4.0, 4)),
            QuoteOutcome::Accepted
        );
    }

    #[test]
    fn test_elapsed_equal_to_period_is_throttled() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(1.0, 2.0, 1));
        f.clock.advance(PERIOD);
        assert_eq!(
            f.instrument.apply_quote(&quote(1.5, 2.5, 2)),
            QuoteOutcome::Throttled
        );
    }

    #[test]
    fn test_rejected_quotes_do_not_extend_window() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(1.0, 2.0, 1));

        for _ in 0..9 {
            f.clock.advance(Duration::from_millis(10));
            f.instrument.apply_quote(&quote(9.0, 9.0, 9));
        }
        // 90ms of rejected traffic, then past the window from the accept.
        f.clock.advance(Duration::from_millis(11));
        assert_eq!(
            f.instrument.apply_quote(&quote(2.0, 3.0, 2)),
            QuoteOutcome::Accepted
        );
    }

    #[test]
    fn test_quote_replaces_volume() {
        let f = fixture(0);
        f.instrument.apply_order(&Order::bid(1.0, 40)).unwrap();
        assert_eq!(f.instrument.snapshot().volume, 40);

        f.instrument.apply_quote(&quote(1.0, 2.0, 7));
        assert_eq!(f.instrument.snapshot().volume, 7);
    }

    #[test]
    fn test_quote_delta_signs() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(10.0, 10.05, 1));
        let snap = f.instrument.snapshot();
        assert_eq!(snap.delta_bid, DeltaSign::Up);
        assert_eq!(snap.delta_ask, DeltaSign::Up);

        f.clock.advance(PERIOD * 2);
        f.instrument.apply_quote(&quote(9.5, 10.05, 1));
        let snap = f.instrument.snapshot();
        assert_eq!(snap.delta_bid, DeltaSign::Down);
        assert_eq!(snap.delta_ask, DeltaSign::Flat);
    }

    #[test]
    fn test_orders_never_throttled() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(10.0, 10.05, 0));

        f.instrument.apply_order(&Order::ask(10.10, 2)).unwrap();
        f.instrument.apply_order(&Order::ask(10.20, 4)).unwrap();

        let snap = f.instrument.snapshot();
        assert_eq!(snap.ask_price, 10.20);
        assert_eq!(snap.ask_qty, 4);
        assert_eq!(snap.delta_ask, DeltaSign::Up);
        assert_eq!(snap.volume, 6);
    }

    #[test]
    fn test_order_does_not_touch_accept_time() {
        let f = fixture(0);
        f.instrument.apply_order(&Order::bid(5.0, 1)).unwrap();
        assert!(f.instrument.last_accepted_at().is_none());

        f.instrument.apply_quote(&quote(1.0, 2.0, 1));
        let accepted_at = f.instrument.last_accepted_at();
        f.clock.advance(Duration::from_millis(30));
        f.instrument.apply_order(&Order::bid(5.0, 1)).unwrap();
        assert_eq!(f.instrument.last_accepted_at(), accepted_at);
    }

    #[test]
    fn test_order_volume_accumulates() {
        let f = fixture(0);
        let quantities = [3, 7, 11, 1];
        for (i, q) in quantities.iter().enumerate() {
            let order = if i % 2 == 0 {
                Order::bid(1.0, *q)
            } else {
                Order::ask(2.0, *q)
            };
            f.instrument.apply_order(&order).unwrap();
        }
        assert_eq!(f.instrument.snapshot().volume, 22);
    }

    #[test]
    fn test_invalid_order_leaves_state_untouched() {
        let mut f = fixture(0);
        f.instrument.apply_order(&Order::bid(5.0, 2)).unwrap();
        let before = f.instrument.snapshot();
        let _ = f.rx.try_recv();

        assert!(f.instrument.apply_order(&Order::bid(6.0, 0)).is_err());
        assert!(f.instrument.apply_order(&Order::ask(f64::NAN, 1)).is_err());

        assert_eq!(f.instrument.snapshot(), before);
        assert!(f.rx.try_recv().is_err());
    }

    #[test]
    fn test_reset_is_idempotent_and_keeps_identity() {
        let f = fixture(4);
        f.instrument.apply_quote(&quote(10.0, 10.05, 100));
        f.instrument.apply_order(&Order::ask(11.0, 3)).unwrap();
        let accepted_at = f.instrument.last_accepted_at();

        f.instrument.reset();
        let first = f.instrument.snapshot();
        f.instrument.reset();
        let second = f.instrument.snapshot();

        assert_eq!(first, second);
        assert_eq!(first, InstrumentSnapshot::zeroed(InstrumentId::new(4)));
        assert_eq!(f.instrument.label(), "Instrument 4");
        assert_eq!(f.instrument.refresh_period(), PERIOD);
        assert_eq!(f.instrument.last_accepted_at(), accepted_at);
    }

    #[test]
    fn test_reset_keeps_throttle_clock() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(10.0, 10.05, 100));
        f.instrument.reset();
        f.clock.advance(Duration::from_millis(10));
        assert_eq!(
            f.instrument.apply_quote(&quote(1.0, 2.0, 1)),
            QuoteOutcome::Throttled
        );
    }

    #[test]
    fn test_period_change_seen_on_next_decision() {
        let f = fixture(0);
        f.instrument.apply_quote(&quote(1.0, 2.0, 1));
        f.clock.advance(Duration::from_millis(30));
        assert_eq!(
            f.instrument.apply_quote(&quote(1.0, 2.0, 1)),
            QuoteOutcome::Throttled
        );

        f.period.set(Duration::from_millis(20));
        assert_eq!(
            f.instrument.apply_quote(&quote(1.5, 2.5, 2)),
            QuoteOutcome::Accepted
        );
    }

    #[test]
    fn test_notifications_batch_changed_fields() {
        let mut f = fixture(1);
        f.instrument.apply_quote(&Quote::new(10.0, 5, 10.05, 5, 100));

        let update = f.rx.try_recv().unwrap();
        assert_eq!(update.instrument, InstrumentId::new(1));
        assert_eq!(update.source, UpdateSource::Quote);
        assert_eq!(
            update.changed,
            vec![
                Field::BidPrice,
                Field::BidQty,
                Field::AskPrice,
                Field::AskQty,
                Field::Volume,
                Field::DeltaBid,
                Field::DeltaAsk,
            ]
        );
        assert_eq!(update.snapshot, f.instrument.snapshot());

        f.instrument.apply_order(&Order::bid(10.01, 5)).unwrap();
        let update = f.rx.try_recv().unwrap();
        assert_eq!(update.source, UpdateSource::Order);
        // Quantity and delta are unchanged (5 -> 5, Up -> Up).
        assert_eq!(update.changed, vec![Field::BidPrice, Field::Volume]);
    }

    #[test]
    fn test_throttled_quote_publishes_nothing() {
        let mut f = fixture(0);
        f.instrument.apply_quote(&quote(1.0, 2.0, 1));
        let _ = f.rx.try_recv();

        f.instrument.apply_quote(&quote(5.0, 6.0, 7));
        assert!(f.rx.try_recv().is_err());
    }

    #[test]
    fn test_reset_of_zeroed_instrument_publishes_nothing() {
        let mut f = fixture(0);
        f.instrument.reset();
        assert!(f.rx.try_recv().is_err());
    }
}
