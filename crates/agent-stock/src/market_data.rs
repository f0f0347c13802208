//! Typed access to the raw market data carried by an analysis context

use agent_core::{AnalysisContext, DataValue};

use crate::error::{Result, StockError};

/// Raw data keys understood by the stock agents
pub mod keys {
    /// Closing prices, oldest first
    pub const PRICES: &str = "prices";
    pub const PE_RATIO: &str = "pe_ratio";
    /// Year-over-year revenue growth as a fraction (0.12 = 12%)
    pub const REVENUE_GROWTH: &str = "revenue_growth";
    /// Net profit margin as a fraction
    pub const PROFIT_MARGIN: &str = "profit_margin";
    /// Per-article sentiment scores in -1..=1
    pub const NEWS_SENTIMENT: &str = "news_sentiment";
}

/// Market regime reported in the request metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketRegime {
    Normal,
    HighVolatility,
    Bull,
    Bear,
}

impl MarketRegime {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high_volatility" | "volatile" => Self::HighVolatility,
            "bull" | "bullish" => Self::Bull,
            "bear" | "bearish" => Self::Bear,
            _ => Self::Normal,
        }
    }

    /// Regime of a context, `Normal` when unspecified
    pub fn of(context: &AnalysisContext) -> Self {
        context.market_regime().map_or(Self::Normal, Self::parse)
    }
}

/// Read a required number series
pub fn series(context: &AnalysisContext, key: &str) -> Result<Vec<f64>> {
    let value = required(context, key)?;
    let numbers = value.as_numbers().ok_or_else(|| StockError::InvalidData {
        key: key.to_string(),
        reason: "expected a list of numbers".to_string(),
    })?;

    if numbers.is_empty() {
        return Err(StockError::unavailable(
            context.subject_id(),
            format!("'{key}' is empty"),
        ));
    }
    Ok(numbers)
}

/// Read a required number
pub fn number(context: &AnalysisContext, key: &str) -> Result<f64> {
    required(context, key)?
        .as_f64()
        .ok_or_else(|| StockError::InvalidData {
            key: key.to_string(),
            reason: "expected a number".to_string(),
        })
}

/// Read an optional number; anything that is not a number counts as absent
pub fn optional_number(context: &AnalysisContext, key: &str) -> Option<f64> {
    context.raw(key).and_then(DataValue::as_f64)
}

fn required<'a>(context: &'a AnalysisContext, key: &str) -> Result<&'a DataValue> {
    context
        .raw(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| StockError::unavailable(context.subject_id(), format!("missing '{key}'")))
}
