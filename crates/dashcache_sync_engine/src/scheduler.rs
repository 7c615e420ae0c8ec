//! Background sync scheduler.
//!
//! One cancellable tokio task per engine. Each wake runs an incremental
//! sync; shutdown is signalled over a `watch` channel and takes effect at
//! the next wake boundary, never mid-sync.

use crate::engine::SyncEngine;
use crate::source::RecordSource;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// A running scheduler task and its shutdown signal.
pub(crate) struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<S: RecordSource + 'static> SyncEngine<S> {
    /// Starts the periodic background sync loop.
    ///
    /// Once per configured interval the loop runs
    /// [`incremental_sync`](Self::incremental_sync); a cycle with failed
    /// collections only adds error-log entries, so the loop never
    /// terminates on a transient failure. The first scheduled sync runs
    /// one full interval after start.
    ///
    /// Idempotent: a no-op if the loop is already running.
    pub fn start_background_loop(self: &Arc<Self>) {
        let mut slot = self.scheduler.lock();
        if slot.is_some() {
            debug!("sync scheduler already running");
            return;
        }

        let (shutdown, mut rx) = watch::channel(false);
        let engine = Arc::clone(self);
        let interval = self.config().sync_interval;

        let task = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "sync scheduler started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so the
            // first scheduled sync runs a full interval after start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = rx.changed() => {
                        info!("sync scheduler shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let counts = engine.incremental_sync().await;
                        debug!(total = counts.total(), "scheduled sync complete");
                    }
                }
            }
        });

        *slot = Some(SchedulerHandle { shutdown, task });
    }

    /// Whether the background loop is currently running.
    #[must_use]
    pub fn background_loop_running(&self) -> bool {
        self.scheduler.lock().is_some()
    }

    /// Signals the background loop to exit and waits for it, bounded by
    /// the configured shutdown timeout.
    ///
    /// Cancellation takes effect at the loop's next wake: a sync already
    /// in flight keeps running until it completes, and its guard releases
    /// the in-flight flag either way. A no-op if the loop is not running.
    pub async fn stop_background_loop(&self) {
        let handle = self.scheduler.lock().take();
        let Some(SchedulerHandle { shutdown, task }) = handle else {
            return;
        };

        let _ = shutdown.send(true);
        if tokio::time::timeout(self.config().shutdown_timeout, task)
            .await
            .is_err()
        {
            warn!("sync scheduler did not stop within timeout; detaching");
        }
    }
}
