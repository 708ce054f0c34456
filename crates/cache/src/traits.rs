//! Storage traits for the fast key-value cache

use async_trait::async_trait;
use opsgate_core::Result;
use std::time::Duration;

/// A string key-value store with per-entry expiry.
///
/// Implementations are shared by every in-flight request and must make the
/// latest committed write visible to all readers. Expired entries read as
/// absent.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a live entry
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry, replacing any previous value and expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete an entry; returns whether a live entry existed
    async fn delete(&self, key: &str) -> Result<bool>;
}
