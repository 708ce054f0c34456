//! Display implementations for error types

use super::types::{AuthFailure, Error, StoreKind};
use std::fmt;

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            AuthFailure::MissingToken => "no authentication token provided",
            AuthFailure::MalformedToken => "token is malformed or its signature is invalid",
            AuthFailure::Expired => "session expired, please re-authenticate",
            AuthFailure::SupersededSession => "logged in elsewhere, please re-authenticate",
            AuthFailure::Forbidden => "permission denied",
            AuthFailure::InvalidCredentials => "invalid username or password",
            AuthFailure::AccountDisabled => "account is disabled, contact an administrator",
        };
        f.write_str(message)
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Cache => f.write_str("cache"),
            StoreKind::Relational => f.write_str("relational store"),
            StoreKind::Audit => f.write_str("audit store"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth { reason } => write!(f, "{reason}"),
            Error::Validation { field, message } => {
                write!(f, "invalid request field '{field}': {message}")
            }
            Error::DownstreamUnavailable { operation, message } => {
                write!(f, "cluster operation '{operation}' failed: {message}")
            }
            Error::StoreUnavailable {
                store,
                operation,
                message,
            } => {
                write!(f, "{store} unavailable during {operation}: {message}")
            }
            Error::Signing { message } => write!(f, "failed to sign token: {message}"),
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}
