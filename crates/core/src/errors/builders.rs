//! Builder methods for creating errors with context

use super::types::{AuthFailure, Error, StoreKind};
use std::time::Duration;

impl Error {
    /// Create an auth error with the given reason
    #[must_use]
    pub fn auth(reason: AuthFailure) -> Self {
        Error::Auth { reason }
    }

    #[must_use]
    pub fn malformed_token() -> Self {
        Error::auth(AuthFailure::MalformedToken)
    }

    #[must_use]
    pub fn expired() -> Self {
        Error::auth(AuthFailure::Expired)
    }

    #[must_use]
    pub fn superseded_session() -> Self {
        Error::auth(AuthFailure::SupersededSession)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Error::auth(AuthFailure::Forbidden)
    }

    /// Create a request validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a downstream (cluster API) error
    #[must_use]
    pub fn downstream(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DownstreamUnavailable {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a store-unavailable error
    #[must_use]
    pub fn store_unavailable(
        store: StoreKind,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::StoreUnavailable {
            store,
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a token signing error
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Error::Signing {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }
}
