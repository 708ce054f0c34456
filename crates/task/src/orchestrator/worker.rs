use opsgate_core::errors::log_and_continue;
use opsgate_core::{Error, Result, ScaleAction};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::audit::{AuditRecord, AuditSink};
use crate::cluster::ClusterClient;
use crate::job::{AuditStatus, TargetOutcome, TargetResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedResource {
    pub resource: String,
    pub reason: String,
}

/// Result of a single-target scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleReport {
    pub target: String,
    pub action: ScaleAction,
    pub replicas: i32,
    pub updated: Vec<String>,
    pub failed: Vec<FailedResource>,
    pub audit: AuditStatus,
}

/// Applies one action to one target
#[derive(Clone)]
pub(super) struct TargetWorker {
    pub(super) cluster: Arc<dyn ClusterClient>,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) request_timeout: Duration,
}

impl TargetWorker {
    /// Batch semantics: the first failing resource fails the target and
    /// leaves the rest untouched. Only a fully scaled target is audited.
    pub(super) async fn run(
        &self,
        target: &str,
        action: ScaleAction,
        actor: &str,
    ) -> TargetOutcome {
        match self.apply(target, action).await {
            Ok(resources_updated) => TargetOutcome {
                target: target.to_string(),
                result: TargetResult::Succeeded,
                audit: self.write_audit(target, action, actor).await,
                resources_updated,
            },
            Err(error) => TargetOutcome::failed(target, error.to_string()),
        }
    }

    async fn apply(&self, target: &str, action: ScaleAction) -> Result<usize> {
        let replicas = action.desired_replicas();
        let resources = self
            .call("list_scalable", self.cluster.list_scalable(target))
            .await?;
        for resource in &resources {
            self.call(
                "set_replicas",
                self.cluster.set_replicas(target, &resource.name, replicas),
            )
            .await?;
            debug!(resource = %resource.name, replicas, "replicas set");
        }
        Ok(resources.len())
    }

    /// Single-target semantics: every resource is attempted and failures are
    /// reported per resource. The action is audited regardless.
    pub(super) async fn scale_all(
        &self,
        target: &str,
        action: ScaleAction,
        actor: &str,
    ) -> Result<ScaleReport> {
        let replicas = action.desired_replicas();
        let resources = self
            .call("list_scalable", self.cluster.list_scalable(target))
            .await?;

        let mut updated = Vec::with_capacity(resources.len());
        let mut failed = Vec::new();
        for resource in resources {
            match self
                .call(
                    "set_replicas",
                    self.cluster.set_replicas(target, &resource.name, replicas),
                )
                .await
            {
                Ok(()) => updated.push(resource.name),
                Err(error) => {
                    warn!(resource = %resource.name, error = %error, "resource update failed");
                    failed.push(FailedResource {
                        resource: resource.name,
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(ScaleReport {
            target: target.to_string(),
            action,
            replicas,
            updated,
            failed,
            audit: self.write_audit(target, action, actor).await,
        })
    }

    async fn write_audit(&self, target: &str, action: ScaleAction, actor: &str) -> AuditStatus {
        let record = AuditRecord::now(target, action, actor);
        let result = self.call("audit", self.audit.record(record)).await;
        if log_and_continue(result, "audit") {
            AuditStatus::Written
        } else {
            AuditStatus::Failed
        }
    }

    async fn call<T>(&self, operation: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| Error::timeout(operation, self.request_timeout))?
    }
}
