use serde::Serialize;
use std::fmt;

/// Lifecycle of the backing vector engine as seen by this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum EngineState {
    NotRunning,
    Starting,
    Running,
    Failed(String),
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::NotRunning => write!(f, "not_running"),
            EngineState::Starting => write!(f, "starting"),
            EngineState::Running => write!(f, "running"),
            EngineState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
