//! Integration tests for the sync engine against a revision-aware source.

use async_trait::async_trait;
use dashcache_core::{unix_now, CollectionKind, Record, RecordCache};
use dashcache_sync_engine::{RecordSource, SourceResult, SyncConfig, SyncEngine};
use serde_json::json;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// A source holding revision-stamped documents, filtering on `since` the
/// way the real document store does.
#[derive(Default)]
struct TimelineSource {
    docs: Mutex<Vec<(CollectionKind, u64, Record)>>,
}

impl TimelineSource {
    fn insert(&self, kind: CollectionKind, revision: u64, record: Record) {
        self.docs.lock().unwrap().push((kind, revision, record));
    }
}

#[async_trait]
impl RecordSource for TimelineSource {
    async fn fetch(&self, kind: CollectionKind, since: u64) -> SourceResult<Vec<Record>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, revision, _)| *k == kind && *revision > since)
            .map(|(_, _, record)| record.clone())
            .collect())
    }
}

fn engine_at(
    path: &std::path::Path,
    source: Arc<TimelineSource>,
) -> Arc<SyncEngine<TimelineSource>> {
    Arc::new(SyncEngine::new(
        Arc::new(RecordCache::new(path)),
        source,
        SyncConfig::new().with_sync_interval(Duration::from_secs(60)),
    ))
}

#[tokio::test]
async fn full_then_incremental_against_a_revision_timeline() {
    let source = Arc::new(TimelineSource::default());
    source.insert(CollectionKind::Rewriter, 100, json!({"id": "q1"}));
    source.insert(CollectionKind::Rewriter, 200, json!({"id": "q2"}));
    source.insert(CollectionKind::Adoption, 150, json!({"conversation_id": "c1"}));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache_state.json");
    let engine = engine_at(&path, Arc::clone(&source));

    let counts = engine.full_sync().await;
    assert_eq!(counts.rewriter, 2);
    assert_eq!(counts.adoption, 1);
    assert_eq!(counts.feedback, 0);

    let cursor = engine.cache().cursor();
    assert!(cursor > 0);

    // Nothing newer than the cursor yet: incremental is a no-op.
    let counts = engine.incremental_sync().await;
    assert_eq!(counts.total(), 0);
    assert_eq!(engine.cache().len(CollectionKind::Rewriter), 2);

    // A document lands with a revision past the cursor.
    source.insert(
        CollectionKind::Rewriter,
        unix_now() + 50,
        json!({"id": "q3"}),
    );
    let counts = engine.incremental_sync().await;
    assert_eq!(counts.rewriter, 1);
    assert_eq!(engine.cache().len(CollectionKind::Rewriter), 3);
}

#[tokio::test]
async fn restart_preserves_cursor_but_not_payloads() {
    let source = Arc::new(TimelineSource::default());
    source.insert(CollectionKind::Feedback, 100, json!({"id": "f1"}));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache_state.json");

    let cursor = {
        let engine = engine_at(&path, Arc::clone(&source));
        engine.full_sync().await;
        assert_eq!(engine.cache().len(CollectionKind::Feedback), 1);
        engine.cache().cursor()
    };

    // New process: the snapshot seeds the cursor, collections are empty.
    let engine = engine_at(&path, Arc::clone(&source));
    assert_eq!(engine.cache().cursor(), cursor);
    assert!(engine.cache().is_empty(CollectionKind::Feedback));

    // An incremental sync after restart fetches only post-cursor records;
    // records ingested before the restart stay gone until a full resync.
    source.insert(
        CollectionKind::Feedback,
        unix_now() + 50,
        json!({"id": "f2"}),
    );
    let counts = engine.incremental_sync().await;
    assert_eq!(counts.feedback, 1);
    assert_eq!(engine.cache().len(CollectionKind::Feedback), 1);
    assert_eq!(
        engine.cache().records(CollectionKind::Feedback)[0]["id"],
        "f2"
    );

    // A forced resync recovers everything.
    engine.cache().clear();
    let counts = engine.full_sync().await;
    assert_eq!(counts.feedback, 2);
}

#[tokio::test(start_paused = true)]
async fn startup_shutdown_lifecycle() {
    let source = Arc::new(TimelineSource::default());
    source.insert(CollectionKind::Adoption, 100, json!({"id": "c1"}));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache_state.json");
    let engine = engine_at(&path, Arc::clone(&source));

    // Startup: seed the cache, then hand off to the scheduler.
    let counts = engine.full_sync().await;
    assert_eq!(counts.adoption, 1);
    engine.start_background_loop();

    source.insert(
        CollectionKind::Adoption,
        unix_now() + 50,
        json!({"id": "c2"}),
    );
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(engine.cache().len(CollectionKind::Adoption), 2);

    // Shutdown.
    engine.stop_background_loop().await;
    assert!(!engine.background_loop_running());
}
