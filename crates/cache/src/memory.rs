//! Process-local `KeyValueStore` used for development and tests

use async_trait::async_trait;
use dashmap::DashMap;
use opsgate_core::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::entry::{CacheStats, InMemoryEntry};
use crate::traits::KeyValueStore;

/// Concurrent in-memory store with lazy expiry.
///
/// Expired entries are dropped on the read that finds them, or in bulk by
/// [`MemoryStore::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, InMemoryEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-purged expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining lifetime of a live entry
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.remaining())
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(entry.value.clone()));
            }
            // Release the shard guard before removing
            drop(entry);
            if self
                .entries
                .remove_if(key, |_, entry| entry.is_expired())
                .is_some()
            {
                self.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), InMemoryEntry::new(value.to_string(), ttl));
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired()))
    }
}
