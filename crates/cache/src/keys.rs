//! Cache key layout shared by the session and permission stores

use opsgate_core::{
    PrincipalId, RoleId, ROLE_PERMISSIONS_KEY_PREFIX, ROLE_PERMISSIONS_KEY_SUFFIX,
    TOKEN_KEY_PREFIX,
};

/// Key of a principal's current session token: `token:{id}`
#[must_use]
pub fn token_key(principal: PrincipalId) -> String {
    format!("{TOKEN_KEY_PREFIX}:{principal}")
}

/// Key of a role's serialized permission set: `role:{id}:permissions`
#[must_use]
pub fn role_permissions_key(role: RoleId) -> String {
    format!("{ROLE_PERMISSIONS_KEY_PREFIX}:{role}:{ROLE_PERMISSIONS_KEY_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(token_key(PrincipalId::new(12)), "token:12");
        assert_eq!(role_permissions_key(RoleId::new(3)), "role:3:permissions");
    }
}
