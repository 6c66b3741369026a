//! Schedulable robot actions produced by the parser

use serde::{Deserialize, Serialize};

use super::state::Value;

/// One parsed unit of robot behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Telemetry line, no physical effect
    Log { key: String, value: String },
    /// Both drivetrain channels, in [-1, 1]
    Move { power: f64 },
    /// Intake channel, in [-1, 1]
    Intake { power: f64 },
    /// Spindexer servo, in [0, 1]
    Spindexer { pos: f64 },
    Shoot,
    /// Hold the next action back while physics keeps running
    Sleep {
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    Var { name: String, value: Value },
    /// Aborts the whole run before anything is scheduled
    Error { message: String },
}

impl Action {
    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error { .. })
    }
}

/// Message of the first error sentinel, if any
pub fn first_error(actions: &[Action]) -> Option<&str> {
    actions.iter().find_map(|a| match a {
        Action::Error { message } => Some(message.as_str()),
        _ => None,
    })
}
