//! Persisted sync metadata.
//!
//! The snapshot deliberately excludes record payloads: it carries the sync
//! cursor, per-collection record counts (informational), and the recent
//! error log. On disk it is a small pretty-printed JSON file:
//!
//! ```json
//! {
//!   "cursor": 1702648800,
//!   "record_counts": {"rewriter": 120, "adoption": 4210, "feedback": 87},
//!   "errors": ["[1702648791] adoption sync failed: ..."]
//! }
//! ```

use crate::error::CacheResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-collection record counts at snapshot time.
///
/// Informational only: counts are written for operators inspecting the
/// file, and are not used to restore any state on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    /// Records in the rewriter collection.
    #[serde(default)]
    pub rewriter: usize,
    /// Records in the adoption collection.
    #[serde(default)]
    pub adoption: usize,
    /// Records in the feedback collection.
    #[serde(default)]
    pub feedback: usize,
}

/// On-disk snapshot of the cache's sync metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sync cursor (unix seconds). 0 means no sync has ever completed.
    #[serde(default)]
    pub cursor: u64,
    /// Collection sizes at the time the snapshot was written.
    #[serde(default)]
    pub record_counts: RecordCounts,
    /// Recent sync errors, oldest first, at most 10.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Snapshot {
    /// Reads a snapshot from `path`.
    pub fn read(path: &Path) -> CacheResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes the snapshot to `path` as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> CacheResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache_state.json");

        let snapshot = Snapshot {
            cursor: 1702648800,
            record_counts: RecordCounts {
                rewriter: 2,
                adoption: 10,
                feedback: 1,
            },
            errors: vec!["[1702648791] adoption sync failed: timeout".into()],
        };
        snapshot.write(&path).unwrap();

        let loaded = Snapshot::read(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(Snapshot::read(&path).is_err());
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache_state.json");
        std::fs::write(&path, r#"{"cursor": 42}"#).unwrap();

        let loaded = Snapshot::read(&path).unwrap();
        assert_eq!(loaded.cursor, 42);
        assert_eq!(loaded.record_counts, RecordCounts::default());
        assert!(loaded.errors.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache_state.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(Snapshot::read(&path).is_err());
    }
}
