//! Identifier newtypes

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::constants::SUPER_ADMIN_ROLE_ID;
use crate::errors::Error;

/// Identifier of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(u64);

impl PrincipalId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| Error::validation("principal_id", e.to_string()))
    }
}

impl From<u64> for PrincipalId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a role in the role→menu→permission graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(u64);

impl RoleId {
    /// The built-in super-admin role
    pub const SUPER_ADMIN: RoleId = RoleId(SUPER_ADMIN_ROLE_ID);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
