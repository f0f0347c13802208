//! Error types for pipeline orchestration

use agent_core::AgentError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// One agent that failed inside a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFailure {
    /// Name of the stage the agent belongs to
    pub stage: String,
    pub agent_name: String,
    pub error: AgentError,
}

impl AgentFailure {
    pub fn new(stage: impl Into<String>, agent_name: impl Into<String>, error: AgentError) -> Self {
        Self {
            stage: stage.into(),
            agent_name: agent_name.into(),
            error,
        }
    }
}

/// Error that aborts a whole pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Every agent of a critical stage failed
    #[error("Critical stage '{stage}' failed: all {} agent(s) failed", .failures.len())]
    CriticalStageFailed {
        stage: String,
        failures: Vec<AgentFailure>,
    },

    /// The orchestrator or its configuration is not usable
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfiguration(String),
}

impl PipelineError {
    /// Name of the stage that aborted the run, if any
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::CriticalStageFailed { stage, .. } => Some(stage),
            Self::InvalidConfiguration(_) => None,
        }
    }
}
