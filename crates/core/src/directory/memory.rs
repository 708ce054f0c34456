//! In-memory directory for development and tests.
//!
//! Not durable. Reads take a shared lock, mutations an exclusive one, so a
//! reader never observes a half-applied `replace_role_menus`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::{MenuRecord, PermissionGraph, PrincipalDirectory, RoleMenuLink, UserRecord};
use crate::errors::Result;
use crate::types::{PrincipalId, RoleId};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<PrincipalId, UserRecord>,
    menus: BTreeMap<u64, MenuRecord>,
    role_menus: HashMap<RoleId, Vec<RoleMenuLink>>,
}

/// `PrincipalDirectory` + `PermissionGraph` backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub fn upsert_user(&self, user: UserRecord) {
        self.tables.write().users.insert(user.id, user);
    }

    /// Insert or replace a menu
    pub fn upsert_menu(&self, menu: MenuRecord) {
        self.tables.write().menus.insert(menu.id, menu);
    }

    /// Toggle a menu's enablement; returns false if the menu does not exist
    pub fn set_menu_enabled(&self, menu_id: u64, enabled: bool) -> bool {
        match self.tables.write().menus.get_mut(&menu_id) {
            Some(menu) => {
                menu.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Toggle a user's enablement; returns false if the user does not exist
    pub fn set_user_enabled(&self, id: PrincipalId, enabled: bool) -> bool {
        match self.tables.write().users.get_mut(&id) {
            Some(user) => {
                user.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Move a user to another role
    pub fn set_user_role(&self, id: PrincipalId, role: RoleId) -> bool {
        match self.tables.write().users.get_mut(&id) {
            Some(user) => {
                user.role_id = role;
                true
            }
            None => false,
        }
    }

    /// Replace all menu links of a role with enabled links to `menu_ids`
    pub fn replace_role_menus(&self, role: RoleId, menu_ids: &[u64]) {
        let links = menu_ids
            .iter()
            .map(|&menu_id| RoleMenuLink {
                role_id: role,
                menu_id,
                enabled: true,
            })
            .collect();
        self.tables.write().role_menus.insert(role, links);
    }

    /// Add a single link with explicit enablement
    pub fn link(&self, link: RoleMenuLink) {
        let mut tables = self.tables.write();
        let links = tables.role_menus.entry(link.role_id).or_default();
        links.retain(|l| l.menu_id != link.menu_id);
        links.push(link);
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<UserRecord>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }
}

#[async_trait]
impl PermissionGraph for InMemoryDirectory {
    async fn menus(&self) -> Result<Vec<MenuRecord>> {
        Ok(self.tables.read().menus.values().cloned().collect())
    }

    async fn role_menu_links(&self, role: RoleId) -> Result<Vec<RoleMenuLink>> {
        Ok(self
            .tables
            .read()
            .role_menus
            .get(&role)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str) -> UserRecord {
        UserRecord {
            id: PrincipalId::new(id),
            username: name.to_string(),
            display_name: name.to_uppercase(),
            role_id: RoleId::new(2),
            enabled: true,
            password_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn finds_users_by_name_and_id() {
        let dir = InMemoryDirectory::new();
        dir.upsert_user(user(10, "alice"));
        dir.upsert_user(user(11, "bob"));

        let alice = dir.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.id, PrincipalId::new(10));
        assert!(dir.find_by_username("carol").await.unwrap().is_none());
        assert_eq!(
            dir.find_by_id(PrincipalId::new(11)).await.unwrap().unwrap().username,
            "bob"
        );
    }

    #[tokio::test]
    async fn replacing_role_menus_drops_old_links() {
        let dir = InMemoryDirectory::new();
        let role = RoleId::new(3);
        dir.replace_role_menus(role, &[1, 2]);
        dir.replace_role_menus(role, &[5]);

        let links = dir.role_menu_links(role).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].menu_id, 5);
        assert!(dir.role_menu_links(RoleId::new(9)).await.unwrap().is_empty());
    }

    #[test]
    fn blank_permissions_are_treated_as_absent() {
        let menu = MenuRecord {
            id: 1,
            permission: Some("  ".to_string()),
            enabled: true,
        };
        assert_eq!(menu.permission(), None);
    }
}
