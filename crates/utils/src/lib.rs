//! Shared utilities for the opsgate workspace: tracing setup and the span
//! and event helpers used by the batch orchestrator.

pub mod tracing;

pub use self::tracing::{init, job_completed, job_span, target_span};
