//! The record cache.
//!
//! [`RecordCache`] owns the three record collections, the sync cursor, and
//! the bounded error log. All state lives behind one `RwLock`, so status
//! reads can run while a sync is merging and the orchestrator can share the
//! cache behind an `Arc`.
//!
//! Persistence is metadata-only and best-effort: the snapshot file stores
//! the cursor and error log (plus informational record counts), never the
//! record payloads, and a failed read or write is logged rather than
//! returned.

use crate::collection::Collection;
use crate::record::{CollectionKind, Record};
use crate::snapshot::{RecordCounts, Snapshot};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Maximum number of entries kept in the error log.
pub const ERROR_LOG_CAPACITY: usize = 10;

/// Current wall-clock time as unix seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, Default)]
struct CacheInner {
    cursor: u64,
    collections: [Collection; 3],
    errors: VecDeque<String>,
}

impl CacheInner {
    fn collection(&self, kind: CollectionKind) -> &Collection {
        &self.collections[kind as usize]
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut Collection {
        &mut self.collections[kind as usize]
    }

    fn counts(&self) -> RecordCounts {
        RecordCounts {
            rewriter: self.collection(CollectionKind::Rewriter).len(),
            adoption: self.collection(CollectionKind::Adoption).len(),
            feedback: self.collection(CollectionKind::Feedback).len(),
        }
    }

    fn push_error(&mut self, entry: String) {
        self.errors.push_back(entry);
        while self.errors.len() > ERROR_LOG_CAPACITY {
            self.errors.pop_front();
        }
    }
}

/// In-memory cache of remote records with a persisted sync cursor.
///
/// # Example
///
/// ```
/// use dashcache_core::{CollectionKind, RecordCache};
/// use serde_json::json;
///
/// let cache = RecordCache::in_memory();
/// let added = cache.merge(
///     CollectionKind::Rewriter,
///     vec![json!({"id": "a"}), json!({"id": "b"})],
/// );
/// assert_eq!(added, 2);
/// assert_eq!(cache.len(CollectionKind::Rewriter), 2);
/// ```
#[derive(Debug)]
pub struct RecordCache {
    inner: RwLock<CacheInner>,
    snapshot_path: Option<PathBuf>,
}

impl RecordCache {
    /// Creates a cache persisted at `snapshot_path`.
    ///
    /// Loads any previous snapshot immediately, seeding the cursor and
    /// error log across restarts. Collections always start empty.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        let cache = Self {
            inner: RwLock::new(CacheInner::default()),
            snapshot_path: Some(snapshot_path.into()),
        };
        cache.load_snapshot();
        cache
    }

    /// Creates a cache with no snapshot persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            snapshot_path: None,
        }
    }

    /// Merges `records` into a collection by identity key.
    ///
    /// A record whose key is absent is appended; a record whose key is
    /// already present replaces the existing record in place (the later
    /// value always wins). Returns the number of newly inserted records,
    /// so re-merging an identical batch returns 0 and changes nothing.
    ///
    /// Records without an identity key are skipped.
    pub fn merge(&self, kind: CollectionKind, records: Vec<Record>) -> usize {
        if records.is_empty() {
            return 0;
        }

        let mut inner = self.inner.write();
        let collection = inner.collection_mut(kind);
        let mut added = 0;
        for record in records {
            match kind.identity_of(&record) {
                Some(key) => {
                    if collection.upsert(key, record) {
                        added += 1;
                    }
                }
                None => debug!(collection = %kind, "skipping record without identity key"),
            }
        }
        added
    }

    /// Advances the sync cursor to `value` and persists the snapshot.
    ///
    /// The cursor is monotonically non-decreasing; advancing it backwards
    /// is a caller logic error, and the cache clamps to the current value
    /// rather than moving back.
    pub fn advance_cursor(&self, value: u64) {
        {
            let mut inner = self.inner.write();
            debug_assert!(value >= inner.cursor, "sync cursor must not move backwards");
            inner.cursor = inner.cursor.max(value);
        }
        self.save_snapshot();
    }

    /// The current sync cursor (unix seconds). 0 means never synced.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.inner.read().cursor
    }

    /// Appends a timestamped entry to the error log, keeping the most
    /// recent [`ERROR_LOG_CAPACITY`] entries.
    pub fn log_error(&self, message: impl Into<String>) {
        let entry = format!("[{}] {}", unix_now(), message.into());
        self.inner.write().push_error(entry);
    }

    /// The most recent `limit` error-log entries, oldest first.
    #[must_use]
    pub fn recent_errors(&self, limit: usize) -> Vec<String> {
        let inner = self.inner.read();
        let skip = inner.errors.len().saturating_sub(limit);
        inner.errors.iter().skip(skip).cloned().collect()
    }

    /// Number of records in a collection.
    #[must_use]
    pub fn len(&self, kind: CollectionKind) -> usize {
        self.inner.read().collection(kind).len()
    }

    /// Whether a collection holds no records.
    #[must_use]
    pub fn is_empty(&self, kind: CollectionKind) -> bool {
        self.len(kind) == 0
    }

    /// A clone of a collection's records, in insertion order.
    #[must_use]
    pub fn records(&self, kind: CollectionKind) -> Vec<Record> {
        self.inner.read().collection(kind).records().to_vec()
    }

    /// Current per-collection record counts.
    #[must_use]
    pub fn record_counts(&self) -> RecordCounts {
        self.inner.read().counts()
    }

    /// Empties all three collections, leaving the cursor and error log
    /// untouched. Used by a full sync's replace-all semantics.
    pub fn clear_records(&self) {
        let mut inner = self.inner.write();
        for collection in &mut inner.collections {
            collection.clear();
        }
    }

    /// Full reset for a forced resync: cursor back to 0, collections and
    /// error log emptied, snapshot file deleted.
    pub fn clear(&self) {
        *self.inner.write() = CacheInner::default();
        if let Some(path) = &self.snapshot_path {
            let _ = std::fs::remove_file(path);
        }
        info!("cache cleared; next sync will be a full fetch");
    }

    /// Persists the snapshot, if this cache has a snapshot path.
    ///
    /// Best-effort: a write failure is logged and the cache stays fully
    /// usable in memory.
    pub fn save_snapshot(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let snapshot = {
            let inner = self.inner.read();
            Snapshot {
                cursor: inner.cursor,
                record_counts: inner.counts(),
                errors: inner.errors.iter().cloned().collect(),
            }
        };
        if let Err(e) = snapshot.write(path) {
            warn!(path = %path.display(), error = %e, "could not save cache snapshot");
        }
    }

    /// Restores the cursor and error log from the snapshot file.
    ///
    /// Record payloads are not persisted, so collections remain empty
    /// regardless; a restarted process resumes with the old cursor and
    /// fetches only records newer than it. A missing or unreadable file
    /// means a cold start with cursor 0.
    pub fn load_snapshot(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        if !path.exists() {
            info!("no previous cache state; next sync will be a full fetch");
            return;
        }
        match Snapshot::read(path) {
            Ok(snapshot) => {
                let mut inner = self.inner.write();
                inner.cursor = snapshot.cursor;
                inner.errors = snapshot.errors.into_iter().collect();
                while inner.errors.len() > ERROR_LOG_CAPACITY {
                    inner.errors.pop_front();
                }
                info!(cursor = inner.cursor, "restored cache state from snapshot");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load cache snapshot; starting cold");
            }
        }
    }
}
