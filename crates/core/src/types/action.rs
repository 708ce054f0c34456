//! Scaling actions accepted by the orchestrator

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::constants::{SCALE_DOWN_REPLICAS, SCALE_UP_REPLICAS};
use crate::errors::Error;

/// A scaling action applied to every resource of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAction {
    ScaleUp,
    ScaleDown,
}

impl ScaleAction {
    /// Wire name of the action
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScaleAction::ScaleUp => "scale_up",
            ScaleAction::ScaleDown => "scale_down",
        }
    }

    /// Desired replica count for every resource in the target
    #[must_use]
    pub const fn desired_replicas(self) -> i32 {
        match self {
            ScaleAction::ScaleUp => SCALE_UP_REPLICAS,
            ScaleAction::ScaleDown => SCALE_DOWN_REPLICAS,
        }
    }
}

impl Display for ScaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scale_up" => Ok(ScaleAction::ScaleUp),
            "scale_down" => Ok(ScaleAction::ScaleDown),
            "" => Err(Error::validation("action", "action must not be empty")),
            other => Err(Error::validation(
                "action",
                format!("unknown action '{other}', expected scale_up or scale_down"),
            )),
        }
    }
}
