//! Batch job identity, progress and results

use opsgate_core::{Error, Result, ScaleAction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
}

/// Point-in-time progress of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    /// Targets with a recorded outcome
    pub completed: usize,
    pub total: usize,
}

/// Whether an audit record was written for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Written,
    /// Target failed, nothing to audit
    Skipped,
    /// Target succeeded but the audit write failed
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetResult {
    Succeeded,
    Failed { reason: String },
}

/// Final result for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: String,
    #[serde(flatten)]
    pub result: TargetResult,
    pub audit: AuditStatus,
    /// Resources whose replica count was set
    pub resources_updated: usize,
}

impl TargetOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.result, TargetResult::Succeeded)
    }

    pub(crate) fn failed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            result: TargetResult::Failed {
                reason: reason.into(),
            },
            audit: AuditStatus::Skipped,
            resources_updated: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTarget {
    pub target: String,
    pub reason: String,
}

/// Everything a finished job reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub action: ScaleAction,
    pub actor: String,
    pub total_count: usize,
    pub success: Vec<String>,
    pub failed: Vec<FailedTarget>,
    /// One outcome per target, in submission order
    pub outcomes: Vec<TargetOutcome>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl JobSummary {
    pub(crate) fn from_outcomes(
        job_id: JobId,
        action: ScaleAction,
        actor: String,
        outcomes: Vec<TargetOutcome>,
        elapsed: Duration,
    ) -> Self {
        let mut success = Vec::new();
        let mut failed = Vec::new();
        for outcome in &outcomes {
            match &outcome.result {
                TargetResult::Succeeded => success.push(outcome.target.clone()),
                TargetResult::Failed { reason } => failed.push(FailedTarget {
                    target: outcome.target.clone(),
                    reason: reason.clone(),
                }),
            }
        }
        Self {
            job_id,
            action,
            actor,
            total_count: outcomes.len(),
            success,
            failed,
            outcomes,
            elapsed,
        }
    }

    pub fn success_count(&self) -> usize {
        self.success.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Audit records written by the job
    pub fn audits_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.audit == AuditStatus::Written)
            .count()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Observer for a submitted job.
///
/// Dropping the handle does not cancel the job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: JobId,
    status: watch::Receiver<JobStatus>,
    summary: watch::Receiver<Option<Arc<JobSummary>>>,
}

impl JobHandle {
    pub(crate) fn new(
        job_id: JobId,
        status: watch::Receiver<JobStatus>,
        summary: watch::Receiver<Option<Arc<JobSummary>>>,
    ) -> Self {
        Self {
            job_id,
            status,
            summary,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    /// The summary, if the job already finished
    pub fn summary(&self) -> Option<Arc<JobSummary>> {
        self.summary.borrow().clone()
    }

    /// Wait for the job to finish
    pub async fn wait(&self) -> Result<Arc<JobSummary>> {
        let mut summary = self.summary.clone();
        loop {
            if let Some(done) = summary.borrow_and_update().clone() {
                return Ok(done);
            }
            if summary.changed().await.is_err() {
                return Err(Error::downstream(
                    "batch_job",
                    format!("job {} stopped without a summary", self.job_id),
                ));
            }
        }
    }
}

/// Returned to the submitter as soon as a job is accepted
#[derive(Debug, Clone)]
pub struct BatchAccepted {
    pub job_id: JobId,
    pub total: usize,
    pub handle: JobHandle,
}
