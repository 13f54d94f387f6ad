//! Feed driven by explicit `publish` calls.
//!
//! Useful for replaying recorded quotes and for exercising the monitor
//! deterministically. Publishing while stopped is a silent no-op, the same
//! as a live feed that has been switched off.

use parking_lot::Mutex;
use pricemon_core::{FeedResult, QuoteEvent, QuoteFeed};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 1024;

pub struct ManualFeed {
    tx: broadcast::Sender<QuoteEvent>,
    running: Mutex<bool>,
}

impl ManualFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            running: Mutex::new(false),
        }
    }

    /// Publish one event. Returns the number of subscribers reached, or 0
    /// when stopped.
    pub fn publish(&self, event: QuoteEvent) -> usize {
        let running = self.running.lock();
        if !*running {
            debug!(instrument = %event.instrument, "Manual feed stopped, quote discarded");
            return 0;
        }
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for ManualFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteFeed for ManualFeed {
    fn start(&self) -> FeedResult<()> {
        *self.running.lock() = true;
        Ok(())
    }

    fn stop(&self) {
        *self.running.lock() = false;
    }

    fn is_running(&self) -> bool {
        *self.running.lock()
    }

    fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.tx.subscribe()
    }
}
