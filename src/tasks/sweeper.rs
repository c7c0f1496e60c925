//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, bounding
//! memory held by keys that are written once and never read again.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{Clock, ExpiringCache};

/// Shortest interval the sweeper will run at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Longest interval the sweeper will run at (one year).
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Handle to a running sweep task.
///
/// The task is owned by this handle: `stop` shuts it down and waits for it,
/// and dropping the handle aborts it.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawns a task that sweeps `cache` every `interval`.
    ///
    /// The first sweep happens one full interval after start. The interval is
    /// clamped to between 1 ms and one year. Must be called from within a
    /// tokio runtime.
    ///
    /// # Example
    /// ```ignore
    /// let cache = ExpiringCache::new(Duration::from_secs(60));
    /// let sweeper = Sweeper::start(cache.clone(), Duration::from_secs(300));
    /// // Later, during shutdown:
    /// sweeper.stop().await;
    /// ```
    pub fn start<V, C>(cache: ExpiringCache<V, C>, interval: Duration) -> Self
    where
        V: Clone + Send + 'static,
        C: Clock,
    {
        let interval = interval.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            info!("Starting expiry sweep task with interval of {:?}", interval);

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Expiry sweep task received shutdown");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = cache.sweep();

                        if removed > 0 {
                            info!("Expiry sweep: removed {} expired entries", removed);
                        } else {
                            debug!("Expiry sweep: no expired entries found");
                        }
                    }
                }
            }
        });

        Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    /// Whether the sweep task is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Expiry sweep task ended abnormally: {}", e);
                }
            }
        }

        info!("Expiry sweep task stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
