//! Configuration for pipeline orchestration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::aggregator::{DEFAULT_MAX_ITEMS, StageWeights};
use crate::error::{PipelineError, Result};

/// Environment variable overriding the per-agent timeout, in seconds
pub const ENV_AGENT_TIMEOUT_SECS: &str = "AGENT_TIMEOUT_SECS";
/// Environment variable overriding the summary item cap
pub const ENV_MAX_SUMMARY_ITEMS: &str = "AGENT_MAX_SUMMARY_ITEMS";

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Timeout applied to every single agent invocation
    pub agent_timeout: Duration,

    /// Maximum number of insights and risks kept in a summary
    pub max_summary_items: usize,

    /// Number of analysts the quick pipeline uses when none are marked as core
    pub quick_core_analysts: usize,

    /// Weight of each agent family in the final recommendation
    pub stage_weights: StageWeights,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(60),
            max_summary_items: DEFAULT_MAX_ITEMS,
            quick_core_analysts: 2,
            stage_weights: StageWeights::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration builder
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Apply overrides from the environment
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(secs) = env_number::<u64>(ENV_AGENT_TIMEOUT_SECS)? {
            self.agent_timeout = Duration::from_secs(secs);
        }
        if let Some(items) = env_number::<usize>(ENV_MAX_SUMMARY_ITEMS)? {
            self.max_summary_items = items;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.agent_timeout.is_zero() {
            return Err(PipelineError::InvalidConfiguration(
                "agent_timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_summary_items == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "max_summary_items must be greater than 0".to_string(),
            ));
        }

        if self.quick_core_analysts == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "quick_core_analysts must be greater than 0".to_string(),
            ));
        }

        if !self.stage_weights.is_valid() {
            return Err(PipelineError::InvalidConfiguration(
                "stage weights must be finite and greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            PipelineError::InvalidConfiguration(format!("{key} must be a number, got '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Builder for OrchestratorConfig
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    agent_timeout: Option<Duration>,
    max_summary_items: Option<usize>,
    quick_core_analysts: Option<usize>,
    stage_weights: Option<StageWeights>,
}

impl OrchestratorConfigBuilder {
    /// Set the per-agent timeout
    pub fn agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = Some(timeout);
        self
    }

    /// Set the summary item cap
    pub fn max_summary_items(mut self, items: usize) -> Self {
        self.max_summary_items = Some(items);
        self
    }

    /// Set how many analysts the quick pipeline falls back to
    pub fn quick_core_analysts(mut self, count: usize) -> Self {
        self.quick_core_analysts = Some(count);
        self
    }

    /// Set the stage weights
    pub fn stage_weights(mut self, weights: StageWeights) -> Self {
        self.stage_weights = Some(weights);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<OrchestratorConfig> {
        let defaults = OrchestratorConfig::default();

        let config = OrchestratorConfig {
            agent_timeout: self.agent_timeout.unwrap_or(defaults.agent_timeout),
            max_summary_items: self.max_summary_items.unwrap_or(defaults.max_summary_items),
            quick_core_analysts: self.quick_core_analysts.unwrap_or(defaults.quick_core_analysts),
            stage_weights: self.stage_weights.unwrap_or(defaults.stage_weights),
        };

        config.validate()?;
        Ok(config)
    }
}
