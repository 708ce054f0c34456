//! Request interception: allow-list, bearer authentication and permission check

use opsgate_cache::PermissionCache;
use opsgate_core::{
    AuthFailure, Error, Principal, PrincipalDirectory, RequestContext, Result, BEARER_SCHEME,
    DEFAULT_PUBLIC_OPERATIONS,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::session::{Claims, SessionAuthority};

/// Guards privileged operations.
///
/// A required permission of `""` means "any authenticated principal".
pub struct AccessGate {
    public_operations: HashSet<String>,
    sessions: Arc<SessionAuthority>,
    permissions: PermissionCache,
    directory: Arc<dyn PrincipalDirectory>,
}

impl AccessGate {
    pub fn new(
        sessions: Arc<SessionAuthority>,
        permissions: PermissionCache,
        directory: Arc<dyn PrincipalDirectory>,
    ) -> Self {
        Self {
            public_operations: DEFAULT_PUBLIC_OPERATIONS
                .iter()
                .map(|op| (*op).to_string())
                .collect(),
            sessions,
            permissions,
            directory,
        }
    }

    /// Replace the allow-list of operations that skip authentication
    #[must_use]
    pub fn with_public_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_operations = operations.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_public(&self, operation: &str) -> bool {
        self.public_operations.contains(operation)
    }

    /// Run `handler` if the request may perform `operation`.
    ///
    /// On refusal the handler is never invoked.
    pub async fn guard<F, Fut, T>(
        &self,
        operation: &str,
        authorization: Option<&str>,
        required: &str,
        handler: F,
    ) -> Result<T>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.is_public(operation) {
            debug!(operation = %operation, "public operation");
            return handler(RequestContext {
                operation: operation.to_string(),
                principal: None,
            })
            .await;
        }

        let principal = match self.check_header(authorization, required).await {
            Ok(principal) => principal,
            Err(error) => {
                warn!(operation = %operation, code = error.code(), "request refused");
                return Err(error);
            }
        };
        handler(RequestContext {
            operation: operation.to_string(),
            principal: Some(principal),
        })
        .await
    }

    /// Authenticate a raw token and check `required` against the principal's role
    pub async fn authorize(&self, raw: &str, required: &str) -> Result<Principal> {
        let claims = self.sessions.validate_token(raw).await?;
        self.check_permission(&claims, required).await?;
        Ok(claims.principal())
    }

    async fn check_header(&self, authorization: Option<&str>, required: &str) -> Result<Principal> {
        let raw = bearer_token(authorization)?;
        self.authorize(raw, required).await
    }

    async fn check_permission(&self, claims: &Claims, required: &str) -> Result<()> {
        let required = required.trim();
        if required.is_empty() {
            return Ok(());
        }

        // Role is looked up per request so reassignment applies immediately
        let Some(user) = self.directory.find_by_id(claims.sub).await? else {
            debug!(principal = %claims.sub, "principal no longer exists");
            return Err(Error::forbidden());
        };
        let granted = self.permissions.get_cached(user.role_id).await?;
        if granted.contains(required) {
            Ok(())
        } else {
            debug!(
                principal = %claims.sub,
                role = %user.role_id,
                permission = %required,
                "permission missing"
            );
            Err(Error::forbidden())
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(authorization: Option<&str>) -> Result<&str> {
    let header = authorization
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::auth(AuthFailure::MissingToken))?;
    let mut parts = header.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token)) if !token.is_empty() => Ok(token),
        _ => Err(Error::malformed_token()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Token;
    use opsgate_cache::{CredentialStore, GraphPermissionResolver, MemoryStore};
    use opsgate_core::{InMemoryDirectory, MenuRecord, PrincipalId, RoleId, UserRecord};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const OPERATION: &str = "/api/server/scale";

    struct Fixture {
        gate: AccessGate,
        directory: Arc<InMemoryDirectory>,
        sessions: Arc<SessionAuthority>,
        permissions: PermissionCache,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        directory.upsert_menu(MenuRecord {
            id: 1,
            permission: Some("server:scale".to_string()),
            enabled: true,
        });
        directory.upsert_menu(MenuRecord {
            id: 2,
            permission: Some("user:list".to_string()),
            enabled: true,
        });
        directory.replace_role_menus(RoleId::new(2), &[2]);
        for (id, name, role) in [(10, "alice", 2), (11, "root", 1)] {
            directory.upsert_user(UserRecord {
                id: PrincipalId::new(id),
                username: name.to_string(),
                display_name: name.to_string(),
                role_id: RoleId::new(role),
                enabled: true,
                password_hash: String::new(),
            });
        }

        let sessions = Arc::new(SessionAuthority::generate(CredentialStore::new(store.clone())));
        let resolver = Arc::new(GraphPermissionResolver::new(
            directory.clone(),
            RoleId::SUPER_ADMIN,
        ));
        let permissions = PermissionCache::new(store, resolver, Duration::from_secs(60));
        let gate = AccessGate::new(sessions.clone(), permissions.clone(), directory.clone());
        Fixture {
            gate,
            directory,
            sessions,
            permissions,
        }
    }

    async fn login(f: &Fixture, id: u64, name: &str) -> Token {
        f.sessions.issue_token(PrincipalId::new(id), name).await.unwrap()
    }

    fn header(token: &Token) -> String {
        format!("Bearer {}", token.as_str())
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(
            bearer_token(None).unwrap_err().auth_failure(),
            Some(AuthFailure::MissingToken)
        );
        assert_eq!(
            bearer_token(Some("")).unwrap_err().auth_failure(),
            Some(AuthFailure::MissingToken)
        );
        for bad in ["abc", "bearer abc", "Basic abc", "Bearer", "Bearer "] {
            assert_eq!(
                bearer_token(Some(bad)).unwrap_err().auth_failure(),
                Some(AuthFailure::MalformedToken),
                "header {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn public_operation_skips_authentication() {
        let f = fixture();
        let ctx = f
            .gate
            .guard("/api/system/user/login", None, "anything", |ctx| async move { Ok(ctx) })
            .await
            .unwrap();
        assert!(ctx.principal.is_none());
    }

    #[tokio::test]
    async fn handler_sees_the_principal() {
        let f = fixture();
        let token = login(&f, 10, "alice").await;

        let actor = f
            .gate
            .guard(OPERATION, Some(header(&token).as_str()), "user:list", |ctx| async move {
                Ok(ctx.actor().map(str::to_string))
            })
            .await
            .unwrap();
        assert_eq!(actor.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden_and_handler_not_run() {
        let f = fixture();
        let token = login(&f, 10, "alice").await;
        let ran = AtomicBool::new(false);

        let err = f
            .gate
            .guard(OPERATION, Some(header(&token).as_str()), "server:scale", |_| async {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.auth_failure(), Some(AuthFailure::Forbidden));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn empty_requirement_needs_only_a_session() {
        let f = fixture();
        let token = login(&f, 10, "alice").await;
        assert!(f.gate.authorize(token.as_str(), "").await.is_ok());
    }

    #[tokio::test]
    async fn super_admin_passes_every_check() {
        let f = fixture();
        let token = login(&f, 11, "root").await;
        let principal = f.gate.authorize(token.as_str(), "server:scale").await.unwrap();
        assert_eq!(principal.id, PrincipalId::new(11));
    }

    #[tokio::test]
    async fn superseded_session_is_rejected_before_permissions() {
        let f = fixture();
        let old = login(&f, 10, "alice").await;
        login(&f, 10, "alice").await;

        let err = f.gate.authorize(old.as_str(), "user:list").await.unwrap_err();
        assert_eq!(err.auth_failure(), Some(AuthFailure::SupersededSession));
    }

    #[tokio::test]
    async fn role_change_applies_without_relogin() {
        let f = fixture();
        let token = login(&f, 10, "alice").await;
        assert!(f.gate.authorize(token.as_str(), "server:scale").await.is_err());

        f.directory.set_user_role(PrincipalId::new(10), RoleId::SUPER_ADMIN);
        assert!(f.gate.authorize(token.as_str(), "server:scale").await.is_ok());
    }

    #[tokio::test]
    async fn refreshed_role_permissions_are_enforced() {
        let f = fixture();
        let token = login(&f, 10, "alice").await;
        assert!(f.gate.authorize(token.as_str(), "user:list").await.is_ok());

        f.directory.replace_role_menus(RoleId::new(2), &[1]);
        f.permissions.invalidate(RoleId::new(2)).await.unwrap();

        assert!(f.gate.authorize(token.as_str(), "user:list").await.is_err());
        assert!(f.gate.authorize(token.as_str(), "server:scale").await.is_ok());
    }

    #[tokio::test]
    async fn vanished_principal_is_forbidden() {
        let f = fixture();
        let token = f.sessions.issue_token(PrincipalId::new(99), "ghost").await.unwrap();
        let err = f.gate.authorize(token.as_str(), "user:list").await.unwrap_err();
        assert_eq!(err.auth_failure(), Some(AuthFailure::Forbidden));
    }

    #[tokio::test]
    async fn custom_allow_list_replaces_default() {
        let f = fixture();
        let gate = f.gate.with_public_operations(["/healthz"]);
        assert!(gate.is_public("/healthz"));
        assert!(!gate.is_public("/api/system/user/login"));
    }
}
