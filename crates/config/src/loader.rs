//! Loads configuration from a JSON file and `OPSGATE_*` environment variables

use opsgate_core::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::settings::Config;

pub const ENV_SIGNING_KEY: &str = "OPSGATE_SIGNING_KEY";
pub const ENV_PASSWORD_SALT: &str = "OPSGATE_PASSWORD_SALT";
pub const ENV_ISSUER: &str = "OPSGATE_ISSUER";
pub const ENV_SUPER_ADMIN_ROLE: &str = "OPSGATE_SUPER_ADMIN_ROLE";
pub const ENV_TOKEN_TTL_SECS: &str = "OPSGATE_TOKEN_TTL_SECS";
pub const ENV_BATCH_MAX_CONCURRENT: &str = "OPSGATE_BATCH_MAX_CONCURRENT";
pub const ENV_BATCH_DISPATCH_INTERVAL_MS: &str = "OPSGATE_BATCH_DISPATCH_INTERVAL_MS";
pub const ENV_BATCH_REQUEST_TIMEOUT_MS: &str = "OPSGATE_BATCH_REQUEST_TIMEOUT_MS";
pub const ENV_PUBLIC_OPERATIONS: &str = "OPSGATE_PUBLIC_OPERATIONS";
pub const ENV_LOG_LEVEL: &str = "OPSGATE_LOG_LEVEL";

/// Builds a validated [`Config`]: file, then environment, then `validate()`
#[derive(Debug)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    read_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            read_env: true,
        }
    }

    /// Read this JSON file first
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Skip environment overrides
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn load(self) -> Result<Config> {
        let mut config = match &self.path {
            Some(path) => read_file(path)?,
            None => Config::default(),
        };
        if self.read_env {
            apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Overlay every variable `lookup` knows about onto `config`
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_SIGNING_KEY) {
        config.security.signing_key = Some(v);
    }
    if let Some(v) = lookup(ENV_PASSWORD_SALT) {
        config.security.password_salt = v;
    }
    if let Some(v) = lookup(ENV_ISSUER) {
        config.security.issuer = v;
    }
    if let Some(v) = lookup(ENV_SUPER_ADMIN_ROLE) {
        config.security.super_admin_role = parse(ENV_SUPER_ADMIN_ROLE, &v)?;
    }
    if let Some(v) = lookup(ENV_TOKEN_TTL_SECS) {
        config.session.token_ttl_secs = parse(ENV_TOKEN_TTL_SECS, &v)?;
    }
    if let Some(v) = lookup(ENV_BATCH_MAX_CONCURRENT) {
        config.batch.max_concurrent = parse(ENV_BATCH_MAX_CONCURRENT, &v)?;
    }
    if let Some(v) = lookup(ENV_BATCH_DISPATCH_INTERVAL_MS) {
        config.batch.dispatch_interval_ms = parse(ENV_BATCH_DISPATCH_INTERVAL_MS, &v)?;
    }
    if let Some(v) = lookup(ENV_BATCH_REQUEST_TIMEOUT_MS) {
        config.batch.request_timeout_ms = parse(ENV_BATCH_REQUEST_TIMEOUT_MS, &v)?;
    }
    if let Some(v) = lookup(ENV_PUBLIC_OPERATIONS) {
        config.access.public_operations = v
            .split(',')
            .map(str::trim)
            .filter(|op| !op.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = v;
    }
    Ok(())
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::configuration(format!("{name}={value:?}: {e}")))
}
