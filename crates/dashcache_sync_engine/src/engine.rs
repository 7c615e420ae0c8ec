//! The sync orchestrator.

use crate::config::SyncConfig;
use crate::scheduler::SchedulerHandle;
use crate::source::RecordSource;
use dashcache_core::{unix_now, CollectionKind, RecordCache, RecordCounts};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-collection counts of newly merged records from one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    /// New rewriter records.
    pub rewriter: usize,
    /// New adoption records.
    pub adoption: usize,
    /// New feedback records.
    pub feedback: usize,
}

impl SyncCounts {
    /// The count for one collection.
    #[must_use]
    pub fn get(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Rewriter => self.rewriter,
            CollectionKind::Adoption => self.adoption,
            CollectionKind::Feedback => self.feedback,
        }
    }

    fn set(&mut self, kind: CollectionKind, count: usize) {
        match kind {
            CollectionKind::Rewriter => self.rewriter = count,
            CollectionKind::Adoption => self.adoption = count,
            CollectionKind::Feedback => self.feedback = count,
        }
    }

    /// Total new records across all collections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rewriter + self.adoption + self.feedback
    }
}

/// A point-in-time view of the engine and cache, for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    /// Current sync cursor (unix seconds, 0 = never synced).
    pub cursor: u64,
    /// Whether a sync is executing right now.
    pub is_syncing: bool,
    /// Current per-collection record counts.
    pub record_counts: RecordCounts,
    /// The last (up to) 5 sync errors, oldest first.
    pub recent_errors: Vec<String>,
    /// Scheduled sync interval in seconds.
    pub sync_interval_secs: u64,
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Orchestrates full and incremental refreshes of a [`RecordCache`] from a
/// [`RecordSource`].
///
/// At most one sync executes at any instant, system-wide: the on-demand
/// trigger and the background scheduler both go through an atomic
/// compare-and-swap on the in-flight flag, and a concurrent caller gets
/// all-zero counts back immediately instead of queueing.
///
/// A fetch failure for one collection never aborts the others or the
/// cycle: it is recorded in the cache's error log and the cursor still
/// advances, so [`full_sync`](Self::full_sync) and
/// [`incremental_sync`](Self::incremental_sync) are infallible.
///
/// # Lifecycle
///
/// Construct the cache and engine once at process start, seed with an
/// initial sync, run the scheduler, and stop it at shutdown:
///
/// ```no_run
/// use dashcache_core::RecordCache;
/// use dashcache_sync_engine::{MockSource, SyncConfig, SyncEngine};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = Arc::new(RecordCache::new("cache_state.json"));
///     let source = Arc::new(MockSource::new());
///     let engine = Arc::new(SyncEngine::new(cache, source, SyncConfig::default()));
///
///     engine.full_sync().await;
///     engine.start_background_loop();
///
///     // ... serve requests against engine.cache() ...
///
///     engine.stop_background_loop().await;
/// }
/// ```
pub struct SyncEngine<S: RecordSource> {
    cache: Arc<RecordCache>,
    source: Arc<S>,
    config: SyncConfig,
    in_flight: AtomicBool,
    pub(crate) scheduler: Mutex<Option<SchedulerHandle>>,
}

impl<S: RecordSource> SyncEngine<S> {
    /// Creates a new sync engine over an existing cache and source.
    pub fn new(cache: Arc<RecordCache>, source: Arc<S>, config: SyncConfig) -> Self {
        Self {
            cache,
            source,
            config,
            in_flight: AtomicBool::new(false),
            scheduler: Mutex::new(None),
        }
    }

    /// The cache this engine syncs into.
    #[must_use]
    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether a sync is executing right now.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Takes the in-flight flag, or `None` if a sync is already running.
    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(InFlightGuard {
                flag: &self.in_flight,
            })
    }

    /// Replaces the entire cache contents from the source.
    ///
    /// Clears the three collections, fetches everything (`since = 0`),
    /// merges each collection independently, then advances the cursor to
    /// now and persists. Returns all-zero counts immediately if a sync is
    /// already in flight.
    pub async fn full_sync(&self) -> SyncCounts {
        let Some(_guard) = self.try_begin() else {
            debug!("sync already in progress; skipping full sync");
            return SyncCounts::default();
        };
        self.run_full().await
    }

    /// Fetches and merges only records newer than the current cursor.
    ///
    /// Falls back to a full sync when the cache has never completed one
    /// (cursor = 0). Returns all-zero counts immediately if a sync is
    /// already in flight.
    pub async fn incremental_sync(&self) -> SyncCounts {
        let Some(_guard) = self.try_begin() else {
            debug!("sync already in progress; skipping incremental sync");
            return SyncCounts::default();
        };

        let since = self.cache.cursor();
        if since == 0 {
            info!("no previous sync; falling back to full sync");
            return self.run_full().await;
        }

        info!(since, "starting incremental sync");
        let counts = self.fetch_and_merge(since, "incremental sync").await;
        self.cache.advance_cursor(unix_now());

        if counts.total() > 0 {
            info!(total = counts.total(), "incremental sync merged new records");
        } else {
            debug!("incremental sync found no new records");
        }
        counts
    }

    /// Full-sync body; the caller must already hold the in-flight guard.
    async fn run_full(&self) -> SyncCounts {
        info!("starting full sync");
        self.cache.clear_records();
        let counts = self.fetch_and_merge(0, "sync").await;
        self.cache.advance_cursor(unix_now());
        info!(total = counts.total(), "full sync complete");
        counts
    }

    /// Fetches all three collections concurrently and merges each result.
    ///
    /// Each collection is an independent unit of work: a failed fetch is
    /// logged to the error log and the siblings still merge.
    async fn fetch_and_merge(&self, since: u64, label: &str) -> SyncCounts {
        let (rewriter, adoption, feedback) = tokio::join!(
            self.source.fetch(CollectionKind::Rewriter, since),
            self.source.fetch(CollectionKind::Adoption, since),
            self.source.fetch(CollectionKind::Feedback, since),
        );

        let mut counts = SyncCounts::default();
        for (kind, result) in CollectionKind::ALL
            .into_iter()
            .zip([rewriter, adoption, feedback])
        {
            match result {
                Ok(records) => {
                    let added = self.cache.merge(kind, records);
                    counts.set(kind, added);
                    debug!(collection = %kind, added, "merged batch");
                }
                Err(e) => {
                    warn!(collection = %kind, error = %e, "fetch failed");
                    self.cache.log_error(format!("{kind} {label} failed: {e}"));
                }
            }
        }
        counts
    }

    /// Current engine and cache status for the routing layer.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            cursor: self.cache.cursor(),
            is_syncing: self.is_syncing(),
            record_counts: self.cache.record_counts(),
            recent_errors: self.cache.recent_errors(5),
            sync_interval_secs: self.config.sync_interval.as_secs(),
        }
    }
}
