//! Batch orchestration settings

use opsgate_core::{
    Error, Result, DEFAULT_DISPATCH_INTERVAL, DEFAULT_MAX_CONCURRENT, DEFAULT_REQUEST_TIMEOUT,
};
use std::time::Duration;

/// Limits applied to every batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Targets allowed in flight at once
    pub max_concurrent: usize,
    /// Pause between starting consecutive targets
    pub dispatch_interval: Duration,
    /// Deadline for each individual cluster call
    pub request_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    #[must_use]
    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(Error::configuration("batch max_concurrent must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("batch request_timeout must be non-zero"));
        }
        Ok(())
    }
}
