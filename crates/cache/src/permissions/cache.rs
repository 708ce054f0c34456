use opsgate_core::{Result, RoleId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PermissionResolver, PermissionSet};
use crate::keys::role_permissions_key;
use crate::traits::KeyValueStore;

/// Read-through cache of role permission sets.
///
/// Entries live for `ttl`, after which the next read rebuilds them from the
/// resolver. Two concurrent misses may both resolve and both write; the last
/// write wins and both values are equally fresh.
#[derive(Clone)]
pub struct PermissionCache {
    store: Arc<dyn KeyValueStore>,
    resolver: Arc<dyn PermissionResolver>,
    ttl: Duration,
}

impl PermissionCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        resolver: Arc<dyn PermissionResolver>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            resolver,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Compute the role's set from the authoritative graph, bypassing the cache
    pub async fn resolve(&self, role: RoleId) -> Result<PermissionSet> {
        self.resolver.resolve(role).await
    }

    /// Cached set for `role`, resolving and writing it back on a miss
    pub async fn get_cached(&self, role: RoleId) -> Result<PermissionSet> {
        let key = role_permissions_key(role);
        if let Some(value) = self.store.get(&key).await? {
            debug!(role = %role, "permission cache hit");
            return Ok(PermissionSet::from_cache_value(&value));
        }

        debug!(role = %role, "permission cache miss, resolving");
        let set = self.resolver.resolve(role).await?;
        self.store.set(&key, &set.to_cache_value(), self.ttl).await?;
        Ok(set)
    }

    /// Recompute the role's set and overwrite the cached entry.
    ///
    /// A failed write is logged and returned; the stale entry then lives at
    /// most until its TTL runs out.
    pub async fn invalidate(&self, role: RoleId) -> Result<PermissionSet> {
        let set = self.resolver.resolve(role).await?;
        let key = role_permissions_key(role);
        if let Err(error) = self.store.set(&key, &set.to_cache_value(), self.ttl).await {
            warn!(role = %role, error = %error, "failed to refresh cached role permissions");
            return Err(error);
        }
        debug!(role = %role, count = set.len(), "role permissions refreshed");
        Ok(set)
    }
}
