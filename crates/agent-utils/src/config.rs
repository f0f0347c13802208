//! Configuration management utilities

use serde::{Deserialize, Serialize};

/// Environment variable selecting the deployment environment
pub const ENV_APP_ENV: &str = "APP_ENV";
/// Environment variable holding the tracing filter directives
pub const ENV_RUST_LOG: &str = "RUST_LOG";
/// Environment variable selecting the log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Tracing filter directives, e.g. `info,agent_workflow=debug`
    pub log_filter: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "stock-orchestrator".to_string(),
            environment: "development".to_string(),
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            app_name: defaults.app_name,
            environment: non_empty(ENV_APP_ENV).unwrap_or(defaults.environment),
            log_filter: non_empty(ENV_RUST_LOG).unwrap_or(defaults.log_filter),
            json_logs: non_empty(ENV_LOG_FORMAT)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("json")),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}
