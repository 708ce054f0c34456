//! Audit trail of scaling actions

use async_trait::async_trait;
use chrono::Local;
use opsgate_core::{Result, ScaleAction, AUDIT_TIME_FORMAT};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One applied scaling action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub target: String,
    pub action: ScaleAction,
    pub actor: String,
    /// Local wall clock, `%Y-%m-%d %H:%M:%S`
    pub action_time: String,
    /// Unix milliseconds
    pub timestamp: i64,
}

impl AuditRecord {
    /// Record stamped with the current time
    pub fn now(target: impl Into<String>, action: ScaleAction, actor: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            target: target.into(),
            action,
            actor: actor.into(),
            action_time: now.format(AUDIT_TIME_FORMAT).to_string(),
            timestamp: now.timestamp_millis(),
        }
    }
}

/// Append-only audit destination
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<()>;
}

/// Keeps audit records in memory, in write order
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}
