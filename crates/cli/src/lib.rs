//! opsgate: session, permission and batch-scaling core of the admin backend.
//!
//! [`OpsGate`] is the entry point for request handlers. The `opsgate` binary
//! offers operator tooling on top of the same crates.

pub mod commands;
pub mod service;

pub use commands::Commands;
pub use service::{Collaborators, OpsGate};
