//! Error types for the sync engine.

use thiserror::Error;

/// Result type for source adapter calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a record source must surface when a fetch cannot be served.
///
/// The contract requires a distinguishable failure rather than a silent
/// empty batch: the orchestrator formats these into the cache's error log
/// and continues with the remaining collections.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The source connection is missing required configuration.
    #[error("source misconfigured: {0}")]
    Misconfigured(String),

    /// The source rejected or failed the query.
    #[error("query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SourceError::Unreachable("connection refused".into());
        assert_eq!(err.to_string(), "source unreachable: connection refused");

        let err = SourceError::Misconfigured("missing endpoint".into());
        assert!(err.to_string().contains("misconfigured"));
    }
}
