//! Configuration model.
//!
//! Every section has defaults, so an empty JSON object is a valid file.

use opsgate_core::{
    Error, Result, RoleId, DEFAULT_DISPATCH_INTERVAL, DEFAULT_MAX_CONCURRENT,
    DEFAULT_PUBLIC_OPERATIONS, DEFAULT_REQUEST_TIMEOUT, MAX_SESSION_TTL, SESSION_TTL,
    SUPER_ADMIN_ROLE_ID,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub batch: BatchSettings,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Hex-encoded 32-byte Ed25519 seed. A random key is used when absent.
    pub signing_key: Option<String>,
    pub password_salt: String,
    pub issuer: String,
    pub super_admin_role: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            signing_key: None,
            password_salt: String::new(),
            issuer: "opsgate".to_string(),
            super_admin_role: SUPER_ADMIN_ROLE_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub token_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: SESSION_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSettings {
    pub max_concurrent: usize,
    pub dispatch_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            dispatch_interval_ms: DEFAULT_DISPATCH_INTERVAL.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Operations reachable without a token
    pub public_operations: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            public_operations: DEFAULT_PUBLIC_OPERATIONS
                .iter()
                .map(|op| (*op).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when neither `OPSGATE_LOG` nor `RUST_LOG` is set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.session.token_ttl_secs)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.batch.dispatch_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.batch.request_timeout_ms)
    }

    pub fn super_admin_role(&self) -> RoleId {
        RoleId::new(self.security.super_admin_role)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.token_ttl_secs == 0 {
            return Err(Error::configuration("session.token_ttl_secs must be greater than 0"));
        }
        if self.session.token_ttl_secs > MAX_SESSION_TTL.as_secs() {
            return Err(Error::configuration(format!(
                "session.token_ttl_secs must be at most {}",
                MAX_SESSION_TTL.as_secs()
            )));
        }
        if self.batch.max_concurrent == 0 {
            return Err(Error::configuration("batch.max_concurrent must be greater than 0"));
        }
        if self.batch.request_timeout_ms == 0 {
            return Err(Error::configuration("batch.request_timeout_ms must be greater than 0"));
        }
        if self.security.issuer.trim().is_empty() {
            return Err(Error::configuration("security.issuer must not be empty"));
        }
        if let Some(key) = &self.security.signing_key {
            let key = key.trim();
            if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::configuration(
                    "security.signing_key must be 64 hex characters",
                ));
            }
        }
        Ok(())
    }

    /// Copy safe to print: secrets replaced by a marker
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.security.signing_key.is_some() {
            copy.security.signing_key = Some(REDACTED.to_string());
        }
        if !copy.security.password_salt.is_empty() {
            copy.security.password_salt = REDACTED.to_string();
        }
        copy
    }
}
