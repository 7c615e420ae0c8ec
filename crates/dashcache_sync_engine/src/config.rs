//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for sync orchestration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between scheduled incremental syncs.
    pub sync_interval: Duration,
    /// How long `stop_background_loop` waits for the scheduler task.
    pub shutdown_timeout: Duration,
}

impl SyncConfig {
    /// Creates the default configuration (5 minute sync interval).
    #[must_use]
    pub fn new() -> Self {
        Self {
            sync_interval: Duration::from_secs(300),
            shutdown_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the scheduled sync interval.
    #[must_use]
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets the scheduler shutdown timeout.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SyncConfig::new()
            .with_sync_interval(Duration::from_secs(60))
            .with_shutdown_timeout(Duration::from_secs(1));

        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn default_interval_is_five_minutes() {
        assert_eq!(SyncConfig::default().sync_interval, Duration::from_secs(300));
    }
}
