//! Key-value backed state for opsgate: the per-principal session record and
//! the role permission cache.
//!
//! Everything here talks to a [`KeyValueStore`], the fast external cache that
//! is the single source of truth for which token is current and which
//! permissions a role holds. [`MemoryStore`] is the in-process
//! implementation used in development and tests.

pub mod credentials;
pub mod entry;
pub mod keys;
pub mod memory;
pub mod permissions;
pub mod traits;

pub use credentials::CredentialStore;
pub use entry::{CacheStats, InMemoryEntry};
pub use keys::{role_permissions_key, token_key};
pub use memory::MemoryStore;
pub use permissions::{GraphPermissionResolver, PermissionCache, PermissionResolver, PermissionSet};
pub use traits::KeyValueStore;
