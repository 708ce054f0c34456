//! Authenticated identities and per-request context

use serde::{Deserialize, Serialize};

use super::ids::PrincipalId;

/// An authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
}

impl Principal {
    pub fn new(id: impl Into<PrincipalId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Per-request context handed to a guarded handler.
///
/// `principal` is `None` only for allow-listed operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub operation: String,
    pub principal: Option<Principal>,
}

impl RequestContext {
    /// Display name of the caller, if authenticated
    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.name.as_str())
    }
}
