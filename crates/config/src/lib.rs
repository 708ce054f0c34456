//! Configuration for opsgate services.
//!
//! Sources, lowest precedence first: built-in defaults, a JSON file, then
//! `OPSGATE_*` environment variables. The result is validated before use.

pub mod loader;
pub mod settings;

#[cfg(test)]
mod config_tests;

pub use loader::{apply_env_overrides, ConfigLoader};
pub use settings::{
    AccessConfig, BatchSettings, Config, LoggingConfig, SecurityConfig, SessionConfig,
};
