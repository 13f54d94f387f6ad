//! Throttled instrument state and dispatch.
//!
//! Owns a fixed set of instruments, routes feed quotes and manual orders to
//! them, and publishes a change batch after every accepted mutation.
//!
//! Feed quotes are coalesced per instrument: at most one is accepted per
//! refresh period, measured from the previous accepted quote. Orders are
//! never throttled. Every instrument serializes its own updates behind a
//! single lock, so observers never see a partially applied update.

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod instrument;
pub mod refresh;
pub mod update;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use coordinator::{Coordinator, DispatchStats};
pub use error::{MonitorError, MonitorResult};
pub use instrument::{Instrument, QuoteOutcome};
pub use refresh::RefreshPeriod;
pub use update::{InstrumentSnapshot, InstrumentUpdate, UpdateSource};
