//! Generation job state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the process-wide generation job slot.
///
/// Transitions: `Idle -> Running` on start, `Running -> Idle` on
/// success or failure, `Running -> Cancelling` on a cancel request,
/// `Cancelling -> Idle` once the next checkpoint observes the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    Cancelling,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Idle => write!(f, "idle"),
            JobState::Running => write!(f, "running"),
            JobState::Cancelling => write!(f, "cancelling"),
        }
    }
}
