//! Cluster orchestrator client

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use opsgate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A workload whose replica count can be set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalableResource {
    pub name: String,
    pub replicas: i32,
}

impl ScalableResource {
    pub fn new(name: impl Into<String>, replicas: i32) -> Self {
        Self {
            name: name.into(),
            replicas,
        }
    }
}

/// The two cluster calls a scaling action needs
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Every scalable resource inside `target`
    async fn list_scalable(&self, target: &str) -> Result<Vec<ScalableResource>>;

    /// Set the desired replica count of one resource
    async fn set_replicas(&self, target: &str, resource: &str, replicas: i32) -> Result<()>;
}

/// In-process cluster for development and tests.
///
/// Every call waits `latency` before answering and is counted in a gauge, so
/// callers can observe how many calls were in flight at once. Targets and
/// resources can be told to fail or to never answer.
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    targets: DashMap<String, Vec<ScalableResource>>,
    failing_targets: DashSet<String>,
    failing_resources: DashSet<(String, String)>,
    stalled_targets: DashSet<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Add or replace a target and its resources
    pub fn add_target<I, S>(&self, target: &str, resources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resources = resources
            .into_iter()
            .map(|name| ScalableResource::new(name, 0))
            .collect();
        self.targets.insert(target.to_string(), resources);
    }

    /// Make listing `target` fail
    pub fn fail_target(&self, target: &str) {
        self.failing_targets.insert(target.to_string());
    }

    /// Make updating one resource fail
    pub fn fail_resource(&self, target: &str, resource: &str) {
        self.failing_resources
            .insert((target.to_string(), resource.to_string()));
    }

    /// Make every call against `target` hang forever
    pub fn stall_target(&self, target: &str) {
        self.stalled_targets.insert(target.to_string());
    }

    pub fn replicas(&self, target: &str, resource: &str) -> Option<i32> {
        self.targets
            .get(target)?
            .iter()
            .find(|r| r.name == resource)
            .map(|r| r.replicas)
    }

    /// Highest number of calls that were ever in flight together
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, target: &str) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);

        if self.stalled_targets.contains(target) {
            std::future::pending::<()>().await;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        guard
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn list_scalable(&self, target: &str) -> Result<Vec<ScalableResource>> {
        let _guard = self.enter(target).await;
        if self.failing_targets.contains(target) {
            return Err(Error::downstream(
                "list_scalable",
                format!("target '{target}' is unreachable"),
            ));
        }
        self.targets
            .get(target)
            .map(|resources| resources.clone())
            .ok_or_else(|| {
                Error::downstream("list_scalable", format!("target '{target}' not found"))
            })
    }

    async fn set_replicas(&self, target: &str, resource: &str, replicas: i32) -> Result<()> {
        let _guard = self.enter(target).await;
        if self
            .failing_resources
            .contains(&(target.to_string(), resource.to_string()))
        {
            return Err(Error::downstream(
                "set_replicas",
                format!("update of '{resource}' rejected"),
            ));
        }

        let mut resources = self
            .targets
            .get_mut(target)
            .ok_or_else(|| {
                Error::downstream("set_replicas", format!("target '{target}' not found"))
            })?;
        let entry = resources
            .iter_mut()
            .find(|r| r.name == resource)
            .ok_or_else(|| {
                Error::downstream("set_replicas", format!("resource '{resource}' not found"))
            })?;
        entry.replicas = replicas;
        Ok(())
    }
}
