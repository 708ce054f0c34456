//! Batch scaling for opsgate.
//!
//! [`BatchOrchestrator`] fans a scale action out over many targets with a
//! concurrency ceiling and a pacing delay, and reports one outcome per target
//! through a [`JobHandle`]. Cluster access and the audit trail are injected
//! as [`ClusterClient`] and [`AuditSink`].

pub mod audit;
pub mod cluster;
pub mod config;
pub mod job;
pub mod orchestrator;

pub use audit::{AuditRecord, AuditSink, InMemoryAuditSink};
pub use cluster::{ClusterClient, InMemoryCluster, ScalableResource};
pub use config::BatchConfig;
pub use job::{
    AuditStatus, BatchAccepted, FailedTarget, JobHandle, JobId, JobState, JobStatus, JobSummary,
    TargetOutcome, TargetResult,
};
pub use orchestrator::{BatchOrchestrator, FailedResource, ScaleReport};
