//! The `OpsGate` service facade wiring sessions, permissions, the access gate
//! and the batch orchestrator over injected collaborators.

use opsgate_cache::{
    CredentialStore, GraphPermissionResolver, KeyValueStore, PermissionCache, PermissionSet,
};
use opsgate_config::Config;
use opsgate_core::{
    PermissionGraph, Principal, PrincipalDirectory, PrincipalId, RequestContext, Result, RoleId,
};
use opsgate_security::{AccessGate, Authenticator, Claims, SessionAuthority, Token};
use opsgate_task::{
    AuditSink, BatchAccepted, BatchConfig, BatchOrchestrator, ClusterClient, ScaleReport,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// External systems the service talks to
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn KeyValueStore>,
    pub directory: Arc<dyn PrincipalDirectory>,
    pub graph: Arc<dyn PermissionGraph>,
    pub cluster: Arc<dyn ClusterClient>,
    pub audit: Arc<dyn AuditSink>,
}

pub struct OpsGate {
    sessions: Arc<SessionAuthority>,
    authenticator: Authenticator,
    permissions: PermissionCache,
    gate: AccessGate,
    orchestrator: BatchOrchestrator,
}

impl OpsGate {
    pub fn new(config: &Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let Collaborators {
            store,
            directory,
            graph,
            cluster,
            audit,
        } = collaborators;

        let credentials = CredentialStore::new(Arc::clone(&store));
        let sessions = match &config.security.signing_key {
            Some(seed) => SessionAuthority::from_seed_hex(seed, credentials)?,
            None => {
                warn!("no signing key configured, sessions will not survive a restart");
                SessionAuthority::generate(credentials)
            }
        };
        let sessions = Arc::new(
            sessions
                .with_issuer(config.security.issuer.clone())
                .with_validity(config.token_ttl()),
        );

        let resolver = Arc::new(GraphPermissionResolver::new(graph, config.super_admin_role()));
        let permissions = PermissionCache::new(store, resolver, config.token_ttl());
        let gate = AccessGate::new(
            Arc::clone(&sessions),
            permissions.clone(),
            Arc::clone(&directory),
        )
        .with_public_operations(config.access.public_operations.iter().cloned());
        let authenticator = Authenticator::new(
            directory,
            Arc::clone(&sessions),
            config.security.password_salt.clone(),
        );
        let batch = BatchConfig::default()
            .with_max_concurrent(config.batch.max_concurrent)
            .with_dispatch_interval(config.dispatch_interval())
            .with_request_timeout(config.request_timeout());
        let orchestrator = BatchOrchestrator::new(cluster, audit, batch)?;

        Ok(Self {
            sessions,
            authenticator,
            permissions,
            gate,
            orchestrator,
        })
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    /// Log in with username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Token> {
        self.authenticator.authenticate(username, password).await
    }

    /// Resolve a raw token to its principal and check `required`
    pub async fn authorize(&self, token: &str, required: &str) -> Result<Principal> {
        self.gate.authorize(token, required).await
    }

    /// Run `handler` behind the access gate
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
        self.gate.guard(operation, authorization, required, handler).await
    }

    pub async fn logout(&self, principal: PrincipalId) -> Result<()> {
        self.sessions.revoke_token(principal).await
    }

    /// Validate the token, then end its session
    pub async fn logout_with_token(&self, token: &str) -> Result<Claims> {
        let claims = self.sessions.validate_token(token).await?;
        self.sessions.revoke_token(claims.sub).await?;
        Ok(claims)
    }

    /// Start a batch job on the current tokio runtime
    pub fn submit_batch_scale(
        &self,
        targets: Vec<String>,
        action: &str,
        actor: &str,
    ) -> Result<BatchAccepted> {
        self.orchestrator.submit(targets, action, actor)
    }

    pub async fn scale_target(
        &self,
        target: &str,
        action: &str,
        actor: &str,
    ) -> Result<ScaleReport> {
        self.orchestrator.scale_target(target, action, actor).await
    }

    /// Rebuild a role's cached permissions after its menu links changed.
    ///
    /// Call once the role mutation has been committed. A failure here leaves
    /// the previous set cached until its TTL runs out.
    pub async fn refresh_role_permissions(&self, role: RoleId) -> Result<PermissionSet> {
        let set = self.permissions.invalidate(role).await?;
        info!(role = %role, count = set.len(), "role permissions refreshed");
        Ok(set)
    }
}
