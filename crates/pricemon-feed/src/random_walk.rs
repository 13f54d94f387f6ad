//! Background random-walk quote feed.
//!
//! The feed owns a broadcast channel and, while running, one tokio task
//! that publishes a quote per tick. Stopping cancels the task's token and
//! returns immediately; the task observes the cancellation at its next
//! select point and never publishes afterwards.

use crate::config::RandomWalkConfig;
use crate::walk::RandomWalk;
use parking_lot::Mutex;
use pricemon_core::{FeedError, FeedResult, QuoteEvent, QuoteFeed};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Broadcast channel capacity for quote events.
const CHANNEL_CAPACITY: usize = 1024;

struct Worker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Quote feed driven by a [`RandomWalk`].
pub struct RandomWalkFeed {
    config: RandomWalkConfig,
    tx: broadcast::Sender<QuoteEvent>,
    walk: Arc<Mutex<RandomWalk>>,
    worker: Mutex<Option<Worker>>,
}

impl RandomWalkFeed {
    /// Create a stopped feed.
    pub fn new(config: RandomWalkConfig) -> FeedResult<Self> {
        config.validate()?;
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let walk = Arc::new(Mutex::new(RandomWalk::new(&config)));

        Ok(Self {
            config,
            tx,
            walk,
            worker: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RandomWalkConfig {
        &self.config
    }
}

impl QuoteFeed for RandomWalkFeed {
    fn start(&self) -> FeedResult<()> {
        let mut worker = self.worker.lock();
        if let Some(current) = worker.as_ref() {
            if !current.token.is_cancelled() && !current.handle.is_finished() {
                debug!("Random walk feed already running");
                return Ok(());
            }
        }

        let runtime = Handle::try_current().map_err(|_| FeedError::NoRuntime)?;
        let token = CancellationToken::new();
        let handle = runtime.spawn(run_walk(
            self.config.clone(),
            self.walk.clone(),
            self.tx.clone(),
            token.clone(),
        ));
        *worker = Some(Worker { token, handle });

        info!(
            instruments = self.config.instrument_count,
            tick_interval_ms = self.config.tick_interval_ms,
            "Random walk feed started"
        );
        Ok(())
    }

    fn stop(&self) {
        if let Some(worker) = self.worker.lock().take() {
            worker.token.cancel();
            info!("Random walk feed stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.token.is_cancelled() && !w.handle.is_finished())
    }

    fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.tx.subscribe()
    }
}

impl Drop for RandomWalkFeed {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.token.cancel();
        }
    }
}

async fn run_walk(
    config: RandomWalkConfig,
    walk: Arc<Mutex<RandomWalk>>,
    tx: broadcast::Sender<QuoteEvent>,
    token: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let event = walk.lock().next_event();
                // No receivers is normal before the monitor subscribes.
                if tx.send(event).is_err() {
                    trace!("No quote subscribers connected");
                }
            }
        }
    }

    debug!("Random walk task exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn test_feed() -> RandomWalkFeed {
        RandomWalkFeed::new(RandomWalkConfig {
            instrument_count: 3,
            tick_interval_ms: 1,
            seed: Some(11),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let feed = test_feed();
        assert_eq!(feed.start(), Err(FeedError::NoRuntime));
        assert!(!feed.is_running());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RandomWalkFeed::new(RandomWalkConfig {
            tick_interval_ms: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(FeedError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_publishes_while_running() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        tokio_test::assert_ok!(feed.start());
        assert!(feed.is_running());

        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("quote within timeout")
            .unwrap();
        assert!(event.instrument.index() < 3);

        feed.stop();
    }

    #[tokio::test]
    async fn test_start_stop_idempotent() {
        let feed = test_feed();

        feed.stop();
        assert!(!feed.is_running());

        feed.start().unwrap();
        feed.start().unwrap();
        assert!(feed.is_running());

        feed.stop();
        feed.stop();
        assert!(!feed.is_running());
    }

    #[tokio::test]
    async fn test_silent_after_stop() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        feed.start().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        feed.stop();

        // Let the task observe cancellation, then drain what was sent before.
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        feed.start().unwrap();
        feed.stop();
        feed.start().unwrap();
        assert!(feed.is_running());

        let got = timeout(Duration::from_secs(1), rx.recv()).await;
        assert!(got.is_ok());
        feed.stop();
    }
}
