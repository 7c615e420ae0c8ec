//! Source adapter abstraction.
//!
//! The engine never talks to the remote document store directly; it goes
//! through [`RecordSource`], which the embedding application implements
//! over its actual client (HTTP, SDK, etc.). [`MockSource`] provides a
//! scriptable implementation for tests.

use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use dashcache_core::{CollectionKind, Record};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A remote, timestamp-ordered document source.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches records from a collection.
    ///
    /// `since = 0` means all records; any positive value means records
    /// whose source-side revision is strictly greater than `since`.
    ///
    /// Implementations must fail with a [`SourceError`] when unreachable
    /// or misconfigured, never silently return an empty batch.
    async fn fetch(&self, kind: CollectionKind, since: u64) -> SourceResult<Vec<Record>>;
}

/// A scriptable record source for testing.
///
/// Responses and failures are set per collection; every fetch is recorded
/// (collection and `since` value) for assertions. An optional gate blocks
/// fetches until permits are released, which makes concurrency tests
/// deterministic.
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<HashMap<CollectionKind, Vec<Record>>>,
    failures: Mutex<HashMap<CollectionKind, String>>,
    calls: Mutex<Vec<(CollectionKind, u64)>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockSource {
    /// Creates a mock source that returns empty batches for everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the records returned for a collection.
    pub fn set_records(&self, kind: CollectionKind, records: Vec<Record>) {
        self.responses.lock().insert(kind, records);
    }

    /// Makes fetches for a collection fail with the given message.
    pub fn set_failure(&self, kind: CollectionKind, message: impl Into<String>) {
        self.failures.lock().insert(kind, message.into());
    }

    /// Installs a closed gate; fetches block until [`Self::open_gate`]
    /// grants permits (one per fetch).
    pub fn close_gate(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Releases `permits` blocked fetches.
    pub fn open_gate(&self, permits: usize) {
        if let Some(gate) = self.gate.lock().as_ref() {
            gate.add_permits(permits);
        }
    }

    /// All fetches seen so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(CollectionKind, u64)> {
        self.calls.lock().clone()
    }

    /// Total number of fetches seen so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch(&self, kind: CollectionKind, since: u64) -> SourceResult<Vec<Record>> {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.expect("mock gate closed");
            permit.forget();
        }

        self.calls.lock().push((kind, since));

        if let Some(message) = self.failures.lock().get(&kind) {
            return Err(SourceError::Unreachable(message.clone()));
        }
        Ok(self.responses.lock().get(&kind).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_returns_scripted_records() {
        let source = MockSource::new();
        source.set_records(CollectionKind::Rewriter, vec![json!({"id": "a"})]);

        let records = source.fetch(CollectionKind::Rewriter, 0).await.unwrap();
        assert_eq!(records.len(), 1);

        // Unscripted collections are empty, not errors.
        let records = source.fetch(CollectionKind::Adoption, 0).await.unwrap();
        assert!(records.is_empty());

        assert_eq!(
            source.calls(),
            vec![(CollectionKind::Rewriter, 0), (CollectionKind::Adoption, 0)]
        );
    }

    #[tokio::test]
    async fn mock_scripted_failure() {
        let source = MockSource::new();
        source.set_failure(CollectionKind::Adoption, "connection refused");

        let err = source.fetch(CollectionKind::Adoption, 5).await.unwrap_err();
        assert!(matches!(err, SourceError::Unreachable(_)));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn gate_blocks_until_opened() {
        let source = Arc::new(MockSource::new());
        source.close_gate();

        let cloned = Arc::clone(&source);
        let fetch = tokio::spawn(async move { cloned.fetch(CollectionKind::Feedback, 0).await });

        tokio::task::yield_now().await;
        assert_eq!(source.call_count(), 0);

        source.open_gate(1);
        fetch.await.unwrap().unwrap();
        assert_eq!(source.call_count(), 1);
    }
}
