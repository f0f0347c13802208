//! Error types for stock analysis operations

use agent_core::AgentError;
use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Data is present but has the wrong shape
    #[error("Invalid data for '{key}': {reason}")]
    InvalidData { key: String, reason: String },

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert StockError to agent_core::AgentError
impl From<StockError> for AgentError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::DataUnavailable { .. } | StockError::InvalidData { .. } => {
                AgentError::DataUnavailable(err.to_string())
            }
            StockError::IndicatorError(_) | StockError::ConfigError(_) => {
                AgentError::Other(err.to_string())
            }
        }
    }
}

impl From<ta::errors::TaError> for StockError {
    fn from(err: ta::errors::TaError) -> Self {
        StockError::IndicatorError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::unavailable("AAPL", "No price history");
        assert_eq!(err.to_string(), "Data not available for AAPL: No price history");

        let err = StockError::InvalidData {
            key: "prices".to_string(),
            reason: "expected a list of numbers".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid data for 'prices': expected a list of numbers"
        );
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: AgentError = StockError::unavailable("AAPL", "no news").into();
        match agent_err {
            AgentError::DataUnavailable(msg) => assert!(msg.contains("no news")),
            other => panic!("Expected DataUnavailable variant, got {other:?}"),
        }

        let agent_err: AgentError = StockError::IndicatorError("period 0".to_string()).into();
        assert!(matches!(agent_err, AgentError::Other(_)));
    }
}
