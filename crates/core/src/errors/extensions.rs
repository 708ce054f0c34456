//! Extension traits for error handling

use super::types::{Error, Result};

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Configuration {
            message: format!("{}: {}", message.into(), e),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Configuration {
            message: format!("{}: {}", f(), e),
        })
    }
}

/// Log an error that must not abort the surrounding operation.
///
/// Returns `true` when the result was `Ok`.
pub fn log_and_continue<T>(result: Result<T>, operation: &str) -> bool {
    match result {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(operation = %operation, error = %error, "non-fatal failure");
            false
        }
    }
}
