//! Instrument registry and dispatch.
//!
//! The coordinator owns a fixed-length set of instruments and is the only
//! entry point for mutating them:
//! - Feed quotes arrive through a pump task and go to `on_quote`
//! - Manual orders go to `apply_order`
//! - The refresh period, test mode and feed state are controlled here
//!
//! Out-of-range indexes are always reported as `OutOfRangeIndex` by the
//! public calls. The feed pump drops such quotes, logs them and counts them
//! as dropped.

use crate::clock::{Clock, MonotonicClock};
use crate::error::{MonitorError, MonitorResult};
use crate::instrument::{Instrument, QuoteOutcome};
use crate::refresh::RefreshPeriod;
use crate::update::{InstrumentSnapshot, InstrumentUpdate};
use parking_lot::{Mutex, RwLock};
use pricemon_core::{FeedError, InstrumentId, Order, Quote, QuoteEvent, QuoteFeed};
use pricemon_telemetry::Metrics;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the instrument update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 1024;

/// Dispatch counters.
#[derive(Debug, Default)]
struct DispatchCounters {
    quotes_accepted: AtomicU64,
    quotes_throttled: AtomicU64,
    quotes_dropped: AtomicU64,
    orders_applied: AtomicU64,
    orders_rejected: AtomicU64,
}

/// Point-in-time copy of the dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub quotes_accepted: u64,
    pub quotes_throttled: u64,
    /// Quotes that never reached an instrument: bad index, lagging pump,
    /// or delivered after the feed was stopped.
    pub quotes_dropped: u64,
    pub orders_applied: u64,
    pub orders_rejected: u64,
}

/// State reachable from the feed pump task.
struct Shared {
    instruments: Box<[Instrument]>,
    counters: DispatchCounters,
    /// Open while the feed is started. The pump holds a read guard for the
    /// duration of one dispatch; `stop_feed` takes the write guard.
    feed_gate: RwLock<bool>,
}

impl Shared {
    fn instrument(&self, index: usize) -> MonitorResult<&Instrument> {
        self.instruments
            .get(index)
            .ok_or(MonitorError::OutOfRangeIndex {
                index,
                count: self.instruments.len(),
            })
    }

    fn on_quote(&self, index: usize, quote: &Quote) -> MonitorResult<QuoteOutcome> {
        let instrument = match self.instrument(index) {
            Ok(instrument) => instrument,
            Err(e) => {
                self.record_dropped(1);
                return Err(e);
            }
        };

        let outcome = instrument.apply_quote(quote);
        match outcome {
            QuoteOutcome::Accepted => {
                self.counters.quotes_accepted.fetch_add(1, Ordering::Relaxed);
                Metrics::quote_accepted();
            }
            QuoteOutcome::Throttled => {
                self.counters
                    .quotes_throttled
                    .fetch_add(1, Ordering::Relaxed);
                Metrics::quote_throttled();
            }
        }
        Ok(outcome)
    }

    fn dispatch_feed_event(&self, event: &QuoteEvent) {
        let gate = self.feed_gate.read();
        if !*gate {
            self.record_dropped(1);
            return;
        }

        if let Err(e) = self.on_quote(event.instrument.index(), &event.quote) {
            warn!(error = %e, "Dropping quote from feed");
        }
    }

    fn record_dropped(&self, count: u64) {
        self.counters
            .quotes_dropped
            .fetch_add(count, Ordering::Relaxed);
        Metrics::quotes_dropped(count);
    }

    fn stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            quotes_accepted: c.quotes_accepted.load(Ordering::Relaxed),
            quotes_throttled: c.quotes_throttled.load(Ordering::Relaxed),
            quotes_dropped: c.quotes_dropped.load(Ordering::Relaxed),
            orders_applied: c.orders_applied.load(Ordering::Relaxed),
            orders_rejected: c.orders_rejected.load(Ordering::Relaxed),
        }
    }
}

struct Pump {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Instrument registry and quote/order dispatcher.
pub struct Coordinator {
    shared: Arc<Shared>,
    refresh_period: Arc<RefreshPeriod>,
    feed: Arc<dyn QuoteFeed>,
    updates: broadcast::Sender<InstrumentUpdate>,
    test_mode: AtomicBool,
    pump: Mutex<Option<Pump>>,
}

impl Coordinator {
    /// Create `count` zeroed instruments sharing `refresh_period`.
    pub fn new(
        count: usize,
        refresh_period: Duration,
        feed: Arc<dyn QuoteFeed>,
    ) -> MonitorResult<Self> {
        Self::with_clock(count, refresh_period, feed, Arc::new(MonotonicClock))
    }

    /// Same as [`Coordinator::new`] with an explicit time source.
    pub fn with_clock(
        count: usize,
        refresh_period: Duration,
        feed: Arc<dyn QuoteFeed>,
        clock: Arc<dyn Clock>,
    ) -> MonitorResult<Self> {
        if count == 0 {
            return Err(MonitorError::InvalidCount);
        }

        let refresh = Arc::new(RefreshPeriod::new(refresh_period));
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let instruments = (0..count)
            .map(|i| {
                Instrument::new(
                    InstrumentId::new(i),
                    refresh.clone(),
                    clock.clone(),
                    updates.clone(),
                )
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Metrics::refresh_period_set(refresh_period.as_secs_f64() * 1000.0);
        info!(
            count,
            refresh_period_ms = refresh_period.as_millis() as u64,
            "Coordinator initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                instruments,
                counters: DispatchCounters::default(),
                feed_gate: RwLock::new(false),
            }),
            refresh_period: refresh,
            feed,
            updates,
            test_mode: AtomicBool::new(false),
            pump: Mutex::new(None),
        })
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.shared.instruments.len()
    }

    /// Always false: a coordinator holds at least one instrument.
    pub fn is_empty(&self) -> bool {
        self.shared.instruments.is_empty()
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.shared.instruments
    }

    pub fn instrument(&self, index: usize) -> MonitorResult<&Instrument> {
        self.shared.instrument(index)
    }

    /// Display label of the instrument at `index`.
    pub fn label(&self, index: usize) -> MonitorResult<&str> {
        self.shared.instrument(index).map(Instrument::label)
    }

    pub fn snapshot(&self, index: usize) -> MonitorResult<InstrumentSnapshot> {
        self.shared.instrument(index).map(Instrument::snapshot)
    }

    pub fn snapshots(&self) -> Vec<InstrumentSnapshot> {
        self.shared.instruments.iter().map(Instrument::snapshot).collect()
    }

    /// Subscribe to instrument change batches.
    pub fn subscribe(&self) -> broadcast::Receiver<InstrumentUpdate> {
        self.updates.subscribe()
    }

    pub fn stats(&self) -> DispatchStats {
        self.shared.stats()
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period.get()
    }

    /// Publish a new refresh period to every instrument.
    ///
    /// Throttle clocks are kept; each instrument applies the new width on
    /// its next quote.
    pub fn set_refresh_period(&self, period: Duration) {
        let old = self.refresh_period.get();
        self.refresh_period.set(period);
        Metrics::refresh_period_set(period.as_secs_f64() * 1000.0);
        info!(
            old_ms = old.as_millis() as u64,
            new_ms = period.as_millis() as u64,
            "Refresh period updated"
        );
    }

    /// Offer a quote to one instrument.
    pub fn on_quote(&self, index: usize, quote: &Quote) -> MonitorResult<QuoteOutcome> {
        self.shared.on_quote(index, quote)
    }

    /// Apply a manual order. Never throttled.
    pub fn apply_order(&self, index: usize, order: &Order) -> MonitorResult<()> {
        let result = self
            .shared
            .instrument(index)
            .and_then(|instrument| instrument.apply_order(order).map_err(MonitorError::from));

        let counters = &self.shared.counters;
        match &result {
            Ok(()) => {
                counters.orders_applied.fetch_add(1, Ordering::Relaxed);
                Metrics::order_applied();
                debug!(index, %order, "Order applied");
            }
            Err(e) => {
                counters.orders_rejected.fetch_add(1, Ordering::Relaxed);
                Metrics::order_rejected();
                debug!(index, %order, error = %e, "Order rejected");
            }
        }
        result
    }

    /// Reset every instrument.
    pub fn reset_all(&self) {
        for instrument in self.shared.instruments.iter() {
            instrument.reset();
        }
        info!(count = self.len(), "All instruments reset");
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::Acquire)
    }

    /// Enter or leave test mode.
    ///
    /// Either transition stops the feed and resets every instrument. While
    /// test mode is on, `start_feed` does nothing.
    pub fn set_test_mode(&self, enabled: bool) {
        self.test_mode.store(enabled, Ordering::Release);
        self.stop_feed();
        self.reset_all();
        info!(enabled, "Test mode changed");
    }

    pub fn is_feed_running(&self) -> bool {
        self.feed.is_running()
    }

    /// Start the feed and the pump that forwards its quotes.
    ///
    /// Returns `Ok(false)` without doing anything when the feed is already
    /// running or test mode is on. Requires a tokio runtime.
    pub fn start_feed(&self) -> MonitorResult<bool> {
        let mut pump = self.pump.lock();

        if self.is_test_mode() {
            debug!("Test mode active, feed not started");
            return Ok(false);
        }
        if pump.is_some() && self.feed.is_running() {
            debug!("Feed already running");
            return Ok(false);
        }

        let runtime = Handle::try_current().map_err(|_| FeedError::NoRuntime)?;
        if let Some(stale) = pump.take() {
            stale.token.cancel();
        }

        // Subscribe before starting so no early quote is missed.
        let rx = self.feed.subscribe();
        *self.shared.feed_gate.write() = true;
        if let Err(e) = self.feed.start() {
            *self.shared.feed_gate.write() = false;
            return Err(e.into());
        }

        let token = CancellationToken::new();
        let handle = runtime.spawn(run_pump(self.shared.clone(), rx, token.clone()));
        *pump = Some(Pump { token, handle });

        Metrics::feed_running(true);
        info!("Quote feed started");
        Ok(true)
    }

    /// Stop the feed. Idempotent; returns whether it was running.
    ///
    /// Waits at most for one in-flight quote dispatch. Quotes delivered
    /// after this returns are dropped.
    pub fn stop_feed(&self) -> bool {
        let mut pump = self.pump.lock();
        *self.shared.feed_gate.write() = false;

        let was_running = self.feed.is_running() || pump.is_some();
        self.feed.stop();
        if let Some(p) = pump.take() {
            p.token.cancel();
        }

        Metrics::feed_running(false);
        if was_running {
            info!("Quote feed stopped");
        }
        was_running
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if let Some(p) = self.pump.get_mut().take() {
            p.token.cancel();
            p.handle.abort();
        }
    }
}

async fn run_pump(
    shared: Arc<Shared>,
    mut rx: broadcast::Receiver<QuoteEvent>,
    token: CancellationToken,
) {
    loop {
        let received = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            received = rx.recv() => received,
        };

        match received {
            Ok(event) => shared.dispatch_feed_event(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Quote pump lagging, quotes dropped");
                shared.record_dropped(skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Quote feed channel closed");
                break;
            }
        }
    }
    debug!("Quote pump exited");
}
