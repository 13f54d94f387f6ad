//! Shared refresh period policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Minimum interval between two accepted feed quotes on one instrument.
///
/// Written by the coordinator, read by every instrument on each throttle
/// decision. A reader racing a writer sees either value; both are valid.
#[derive(Debug)]
pub struct RefreshPeriod {
    nanos: AtomicU64,
}

impl RefreshPeriod {
    pub fn new(period: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(to_nanos(period)),
        }
    }

    pub fn get(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }

    pub fn set(&self, period: Duration) {
        self.nanos.store(to_nanos(period), Ordering::Release);
    }
}

fn to_nanos(period: Duration) -> u64 {
    u64::try_from(period.as_nanos()).unwrap_or(u64::MAX)
}
