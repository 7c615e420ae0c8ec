//! Error types for the record cache.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur in the record cache.
///
/// Only snapshot persistence produces these. The cache treats persistence
/// as best-effort: `save_snapshot` and `load_snapshot` log failures and
/// never surface them, so these errors stay internal to the crate's I/O
/// helpers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file contents are not valid snapshot JSON.
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}
