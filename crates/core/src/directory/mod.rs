//! Read-side view of the relational store consumed by the session and
//! permission layers.
//!
//! The admin backend keeps users, roles, menus and role-menu links in a
//! relational database. This core only ever reads them, through the two
//! traits below. `InMemoryDirectory` implements both for development and
//! tests.

mod memory;

pub use memory::InMemoryDirectory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::{PrincipalId, RoleId};

/// A user row as seen by authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: PrincipalId,
    pub username: String,
    pub display_name: String,
    pub role_id: RoleId,
    pub enabled: bool,
    /// Salted password digest, never logged
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// A menu row; `permission` gates one administrative capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: u64,
    pub permission: Option<String>,
    pub enabled: bool,
}

impl MenuRecord {
    /// The permission string, if present and non-empty
    #[must_use]
    pub fn permission(&self) -> Option<&str> {
        self.permission
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A role→menu association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMenuLink {
    pub role_id: RoleId,
    pub menu_id: u64,
    pub enabled: bool,
}

/// User lookups
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<UserRecord>>;
}

/// Role→menu→permission graph
#[async_trait]
pub trait PermissionGraph: Send + Sync {
    /// Every menu in the registry, enabled or not
    async fn menus(&self) -> Result<Vec<MenuRecord>>;
    /// Links owned by one role, enabled or not
    async fn role_menu_links(&self, role: RoleId) -> Result<Vec<RoleMenuLink>>;
}
