//! Core error type definitions

use std::time::Duration;

/// Result type alias for opsgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why an authentication or authorization attempt was refused.
///
/// Each variant maps to a stable reason code so that clients can tell a
/// "log in again" situation apart from a "permission denied" one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// No bearer credential was presented
    MissingToken,
    /// Credential is not a well-formed token or its signature does not verify
    MalformedToken,
    /// Embedded expiry passed, or the server-side session record is gone
    Expired,
    /// Token is valid but a newer login replaced it
    SupersededSession,
    /// Session is valid but lacks the required permission
    Forbidden,
    /// Unknown principal or wrong password
    InvalidCredentials,
    /// Principal exists but has been disabled
    AccountDisabled,
}

impl AuthFailure {
    /// Stable machine-readable reason code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "token_missing",
            AuthFailure::MalformedToken => "token_malformed",
            AuthFailure::Expired => "session_expired",
            AuthFailure::SupersededSession => "session_superseded",
            AuthFailure::Forbidden => "forbidden",
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::AccountDisabled => "account_disabled",
        }
    }

    /// Whether the client should prompt the user to authenticate again
    #[must_use]
    pub const fn requires_reauthentication(self) -> bool {
        matches!(
            self,
            AuthFailure::MissingToken
                | AuthFailure::MalformedToken
                | AuthFailure::Expired
                | AuthFailure::SupersededSession
        )
    }
}

/// Which external store could not be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// The fast key-value cache holding sessions and permission sets
    Cache,
    /// The relational store holding users, roles and menus
    Relational,
    /// The audit trail
    Audit,
}

/// Core error type for opsgate operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication or authorization refused
    Auth { reason: AuthFailure },

    /// Request has the wrong shape (unknown action, empty target, ...)
    Validation { field: String, message: String },

    /// Cluster API call failed or timed out
    DownstreamUnavailable { operation: String, message: String },

    /// Cache or relational store unreachable
    StoreUnavailable {
        store: StoreKind,
        operation: String,
        message: String,
    },

    /// Token signing failed
    Signing { message: String },

    /// Configuration errors
    Configuration { message: String },

    /// Operation timeout errors
    Timeout { operation: String, duration: Duration },
}

impl Error {
    /// The auth failure reason, if this is an auth error
    #[must_use]
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            Error::Auth { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Stable machine-readable code for any error
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth { reason } => reason.code(),
            Error::Validation { .. } => "validation_error",
            Error::DownstreamUnavailable { .. } | Error::Timeout { .. } => {
                "downstream_unavailable"
            }
            Error::StoreUnavailable { .. } => "store_unavailable",
            Error::Signing { .. } => "signing_error",
            Error::Configuration { .. } => "configuration_error",
        }
    }
}
