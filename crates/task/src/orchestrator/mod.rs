//! Bounded-concurrency fan-out of scaling actions.
//!
//! A submitted job runs on its own spawned task. Targets start in input order,
//! each after acquiring one permit from a per-job semaphore, with a pacing
//! pause between consecutive starts. Every worker reports exactly one outcome;
//! a worker that dies before reporting is counted as failed.

mod worker;

#[cfg(test)]
mod tests;

pub use worker::{FailedResource, ScaleReport};

use opsgate_core::{Error, Result, ScaleAction};
use opsgate_utils::{job_completed, job_span, target_span};
use std::str::FromStr;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use crate::audit::AuditSink;
use crate::cluster::ClusterClient;
use crate::config::BatchConfig;
use crate::job::{
    BatchAccepted, JobHandle, JobId, JobState, JobStatus, JobSummary, TargetOutcome,
};
use worker::TargetWorker;

pub struct BatchOrchestrator {
    cluster: Arc<dyn ClusterClient>,
    audit: Arc<dyn AuditSink>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        audit: Arc<dyn AuditSink>,
        config: BatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cluster,
            audit,
            config,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Validate and start a batch job, returning as soon as it is accepted.
    ///
    /// An empty or unknown action is rejected here and nothing is started.
    /// The job runs on the caller's tokio runtime; calling this outside one
    /// is a configuration error.
    pub fn submit(&self, targets: Vec<String>, action: &str, actor: &str) -> Result<BatchAccepted> {
        let action = ScaleAction::from_str(action.trim())?;
        let runtime = Handle::try_current().map_err(|_| {
            Error::configuration("batch jobs must be submitted from within a tokio runtime")
        })?;
        let job_id = JobId::new();
        let total = targets.len();

        let (status_tx, status_rx) = watch::channel(JobStatus {
            state: JobState::Running,
            completed: 0,
            total,
        });
        let (summary_tx, summary_rx) = watch::channel(None);

        let job = Job {
            id: job_id,
            action,
            actor: actor.to_string(),
            targets,
            config: self.config,
            worker: TargetWorker {
                cluster: Arc::clone(&self.cluster),
                audit: Arc::clone(&self.audit),
                request_timeout: self.config.request_timeout,
            },
        };
        let span = job_span(&job_id.to_string(), action.as_str(), total);
        runtime.spawn(
            async move {
                let summary = job.run(&status_tx).await;
                status_tx.send_modify(|status| status.state = JobState::Completed);
                summary_tx.send_replace(Some(Arc::new(summary)));
            }
            .instrument(span),
        );

        info!(job_id = %job_id, action = %action, actor = %actor, total, "batch scale accepted");
        Ok(BatchAccepted {
            job_id,
            total,
            handle: JobHandle::new(job_id, status_rx, summary_rx),
        })
    }

    /// Scale every resource of one target and wait for the result.
    ///
    /// Resource update failures are collected in the report and do not stop
    /// the remaining resources. Listing failures fail the whole call.
    pub async fn scale_target(
        &self,
        target: &str,
        action: &str,
        actor: &str,
    ) -> Result<ScaleReport> {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::validation("target", "target must not be empty"));
        }
        let action = ScaleAction::from_str(action.trim())?;

        let worker = TargetWorker {
            cluster: Arc::clone(&self.cluster),
            audit: Arc::clone(&self.audit),
            request_timeout: self.config.request_timeout,
        };
        worker
            .scale_all(target, action, actor)
            .instrument(info_span!("scale_target", target = %target, action = %action))
            .await
    }
}

struct Job {
    id: JobId,
    action: ScaleAction,
    actor: String,
    targets: Vec<String>,
    config: BatchConfig,
    worker: TargetWorker,
}

impl Job {
    async fn run(self, status: &watch::Sender<JobStatus>) -> JobSummary {
        let started = Instant::now();
        let total = self.targets.len();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent));
        let (tx, mut rx) = mpsc::channel::<(usize, TargetOutcome)>(total.max(1));

        let dispatch = async {
            let mut workers = JoinSet::new();
            for (index, target) in self.targets.iter().enumerate() {
                if index > 0 && !self.config.dispatch_interval.is_zero() {
                    tokio::time::sleep(self.config.dispatch_interval).await;
                }
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    error!("permit pool closed, remaining targets not started");
                    break;
                };

                let worker = self.worker.clone();
                let tx = tx.clone();
                let target = target.clone();
                let actor = self.actor.clone();
                let action = self.action;
                let span = target_span(&target);
                workers.spawn(
                    async move {
                        let outcome = worker.run(&target, action, &actor).await;
                        drop(permit);
                        // Capacity equals the target count, so this never waits
                        let _ = tx.send((index, outcome)).await;
                    }
                    .instrument(span),
                );
            }
            drop(tx);
            workers
        };

        let collect = async {
            let mut slots: Vec<Option<TargetOutcome>> = vec![None; total];
            while let Some((index, outcome)) = rx.recv().await {
                if outcome.succeeded() {
                    info!(target = %outcome.target, "target scaled");
                } else {
                    warn!(target = %outcome.target, result = ?outcome.result, "target failed");
                }
                slots[index] = Some(outcome);
                status.send_modify(|s| s.completed += 1);
            }
            slots
        };

        let (mut workers, slots) = tokio::join!(dispatch, collect);
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "scale worker terminated abnormally");
            }
        }

        let outcomes: Vec<TargetOutcome> = slots
            .into_iter()
            .zip(&self.targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    status.send_modify(|s| s.completed += 1);
                    TargetOutcome::failed(target.clone(), "worker terminated without reporting")
                })
            })
            .collect();

        let summary = JobSummary::from_outcomes(
            self.id,
            self.action,
            self.actor,
            outcomes,
            started.elapsed(),
        );
        job_completed(
            &self.id.to_string(),
            summary.success_count(),
            summary.failed_count(),
            u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
        );
        summary
    }
}
