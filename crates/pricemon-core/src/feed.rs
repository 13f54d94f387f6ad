//! Quote feed contract.

use crate::error::FeedResult;
use crate::types::QuoteEvent;
use tokio::sync::broadcast;

/// An asynchronous source of quote events.
///
/// Implementations publish on their own execution context. `start` on a
/// running feed and `stop` on a stopped feed are no-ops.
pub trait QuoteFeed: Send + Sync {
    /// Begin publishing quotes.
    fn start(&self) -> FeedResult<()>;

    /// Stop publishing quotes. Must not wait on in-flight deliveries.
    fn stop(&self);

    /// Whether the feed is currently publishing.
    fn is_running(&self) -> bool;

    /// Subscribe to quote events. Subscribers only see events published
    /// after they subscribed.
    fn subscribe(&self) -> broadcast::Receiver<QuoteEvent>;
}
