//! Error types for agent-core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error raised by a single agent invocation
///
/// Agent errors are always isolated to the agent that raised them: the stage
/// runner records them and carries on with the remaining agents.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentError {
    /// The per-agent timeout elapsed
    #[error("Agent timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Required input data is missing from the context
    #[error("Data not available: {0}")]
    DataUnavailable(String),

    /// The underlying service (model, quote API, ...) failed
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// The agent produced output that does not form a valid opinion
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Shorthand for a missing data key
    pub fn missing(key: &str) -> Self {
        Self::DataUnavailable(format!("missing '{key}'"))
    }

    /// Whether this error came from the per-agent timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
