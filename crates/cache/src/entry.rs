//! In-memory entry with expiry

use std::time::Duration;
use tokio::time::Instant;

// Deadline used when `now + ttl` does not fit the clock
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A stored value and the instant it stops being visible
#[derive(Debug, Clone)]
pub struct InMemoryEntry {
    pub value: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl InMemoryEntry {
    pub fn new(value: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now.checked_add(ttl).unwrap_or(now + FAR_FUTURE),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Store access counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub writes: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
