use async_trait::async_trait;
use opsgate_core::{PermissionGraph, Result, RoleId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::PermissionSet;

/// Computes a role's permission set from the authoritative store
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    async fn resolve(&self, role: RoleId) -> Result<PermissionSet>;
}

/// Resolves permissions by walking role -> menu links in a [`PermissionGraph`].
///
/// The super-admin role gets every non-empty permission in the menu registry,
/// enabled or not. Any other role only sees menus that are enabled and reached
/// through an enabled link.
pub struct GraphPermissionResolver {
    graph: Arc<dyn PermissionGraph>,
    super_admin: RoleId,
}

impl GraphPermissionResolver {
    pub fn new(graph: Arc<dyn PermissionGraph>, super_admin: RoleId) -> Self {
        Self { graph, super_admin }
    }

    pub fn super_admin(&self) -> RoleId {
        self.super_admin
    }
}

#[async_trait]
impl PermissionResolver for GraphPermissionResolver {
    async fn resolve(&self, role: RoleId) -> Result<PermissionSet> {
        let menus = self.graph.menus().await?;

        if role == self.super_admin {
            let set: PermissionSet = menus.iter().filter_map(|m| m.permission()).collect();
            debug!(role = %role, count = set.len(), "resolved super-admin permission universe");
            return Ok(set);
        }

        let linked: HashSet<u64> = self
            .graph
            .role_menu_links(role)
            .await?
            .into_iter()
            .filter(|link| link.enabled)
            .map(|link| link.menu_id)
            .collect();

        let set: PermissionSet = menus
            .iter()
            .filter(|menu| menu.enabled && linked.contains(&menu.id))
            .filter_map(|menu| menu.permission())
            .collect();
        debug!(role = %role, count = set.len(), "resolved role permissions");
        Ok(set)
    }
}
