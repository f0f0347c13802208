//! Configuration for the heuristic stock analysts

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every stock agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// RSI look-back period
    pub rsi_period: usize,

    /// Fast moving average period
    pub fast_sma_period: usize,

    /// Slow moving average period
    pub slow_sma_period: usize,

    /// P/E ratio considered fairly valued
    pub fair_pe_ratio: f64,

    /// Confidence multiplier applied in a high-volatility regime
    pub volatility_confidence_factor: f64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            fast_sma_period: 5,
            slow_sma_period: 20,
            fair_pe_ratio: 20.0,
            volatility_confidence_factor: 0.8,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Minimum number of closing prices the technical analyst needs
    pub fn min_price_points(&self) -> usize {
        self.slow_sma_period.max(self.rsi_period + 1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 || self.fast_sma_period == 0 {
            return Err(StockError::ConfigError(
                "indicator periods must be greater than 0".to_string(),
            ));
        }

        if self.fast_sma_period >= self.slow_sma_period {
            return Err(StockError::ConfigError(
                "fast_sma_period must be shorter than slow_sma_period".to_string(),
            ));
        }

        if !(self.fair_pe_ratio.is_finite() && self.fair_pe_ratio > 0.0) {
            return Err(StockError::ConfigError(
                "fair_pe_ratio must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.volatility_confidence_factor) {
            return Err(StockError::ConfigError(
                "volatility_confidence_factor must be within 0..=1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    rsi_period: Option<usize>,
    fast_sma_period: Option<usize>,
    slow_sma_period: Option<usize>,
    fair_pe_ratio: Option<f64>,
    volatility_confidence_factor: Option<f64>,
}

impl StockConfigBuilder {
    /// Set the RSI period
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = Some(period);
        self
    }

    /// Set the fast and slow moving average periods
    pub fn sma_periods(mut self, fast: usize, slow: usize) -> Self {
        self.fast_sma_period = Some(fast);
        self.slow_sma_period = Some(slow);
        self
    }

    /// Set the fair P/E ratio
    pub fn fair_pe_ratio(mut self, ratio: f64) -> Self {
        self.fair_pe_ratio = Some(ratio);
        self
    }

    /// Set the high-volatility confidence multiplier
    pub fn volatility_confidence_factor(mut self, factor: f64) -> Self {
        self.volatility_confidence_factor = Some(factor);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            rsi_period: self.rsi_period.unwrap_or(defaults.rsi_period),
            fast_sma_period: self.fast_sma_period.unwrap_or(defaults.fast_sma_period),
            slow_sma_period: self.slow_sma_period.unwrap_or(defaults.slow_sma_period),
            fair_pe_ratio: self.fair_pe_ratio.unwrap_or(defaults.fair_pe_ratio),
            volatility_confidence_factor: self
                .volatility_confidence_factor
                .unwrap_or(defaults.volatility_confidence_factor),
        };

        config.validate()?;
        Ok(config)
    }
}
