//! Technical analysis agent

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::indicators::{IndicatorSnapshot, interpret_rsi};
use crate::market_data::{MarketRegime, keys, series};
use crate::scoring::{NEUTRAL_SCORE, clamp_confidence, clamp_score, contribution, recommendation_for};

/// Volatility of the slow window above which the analyst flags a risk, in percent
const HIGH_VOLATILITY_PCT: f64 = 5.0;

/// Agent specialized in technical analysis
///
/// Reads the closing price series and combines trend (fast vs slow moving
/// average), momentum and RSI into a score.
pub struct TechnicalAnalyst {
    config: Arc<StockConfig>,
}

impl TechnicalAnalyst {
    pub const NAME: &'static str = "technical_analyst";

    /// Create a new technical analyst
    pub fn new(config: Arc<StockConfig>) -> Self {
        Self { config }
    }

    fn evaluate(&self, context: &AnalysisContext) -> Result<Opinion> {
        let closes = series(context, keys::PRICES)?;
        let required = self.config.min_price_points();
        if closes.len() < required {
            return Err(StockError::unavailable(
                context.subject_id(),
                format!("need at least {required} prices, got {}", closes.len()),
            ));
        }

        let snap = IndicatorSnapshot::compute(
            &closes,
            self.config.rsi_period,
            self.config.fast_sma_period,
            self.config.slow_sma_period,
        )?;
        debug!(
            subject = context.subject_id(),
            rsi = snap.rsi,
            momentum_pct = snap.momentum_pct,
            "Computed technical indicators"
        );

        let mut score = NEUTRAL_SCORE + contribution(snap.momentum_pct, 15.0);
        score += if snap.is_uptrend() { 12.0 } else { -12.0 };
        if snap.is_oversold() {
            score += 8.0;
        } else if snap.is_overbought() {
            score -= 8.0;
        }
        let score = clamp_score(score);

        let signals_agree = snap.is_uptrend() == (snap.momentum_pct > 0.0);
        let mut confidence = if signals_agree { 0.7 } else { 0.55 };

        let mut risks = Vec::new();
        if snap.is_overbought() {
            risks.push("RSI signals overbought conditions".to_string());
        }
        if !snap.is_uptrend() {
            risks.push("Price trend is below its slow moving average".to_string());
        }
        if snap.volatility_pct > HIGH_VOLATILITY_PCT {
            risks.push(format!("High price volatility ({:.1}%)", snap.volatility_pct));
        }
        if MarketRegime::of(context) == MarketRegime::HighVolatility {
            confidence *= self.config.volatility_confidence_factor;
            risks.push("High-volatility market regime".to_string());
        }

        let recommendation = recommendation_for(score);
        let trend = if snap.is_uptrend() { "above" } else { "below" };
        let narrative = format!(
            "{} trades at {:.2}; the {}-day average is {trend} the {}-day average, \
             momentum is {:+.1}% and RSI is {:.1}. Technical view: {recommendation}.",
            context.subject_name(),
            snap.last_price,
            self.config.fast_sma_period,
            self.config.slow_sma_period,
            snap.momentum_pct,
            snap.rsi,
        );

        let mut opinion = Opinion::new(Self::NAME, SourceKind::Analyst, narrative)
            .with_score(score)
            .with_confidence(clamp_confidence(confidence))
            .with_recommendation(recommendation)
            .with_insight(format!(
                "Fast SMA {:.2} {trend} slow SMA {:.2}",
                snap.fast_sma, snap.slow_sma
            ))
            .with_insight(format!("RSI {:.1}: {}", snap.rsi, interpret_rsi(snap.rsi)))
            .with_insight(format!(
                "Momentum {:+.1}% over {} sessions",
                snap.momentum_pct, self.config.slow_sma_period
            ))
            .with_supporting_data("rsi", snap.rsi)
            .with_supporting_data("fast_sma", snap.fast_sma)
            .with_supporting_data("slow_sma", snap.slow_sma)
            .with_supporting_data("momentum_pct", snap.momentum_pct)
            .with_supporting_data("volatility_pct", snap.volatility_pct);
        opinion.risks = risks;

        Ok(opinion)
    }
}

#[async_trait]
impl Agent for TechnicalAnalyst {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.evaluate(context)?)
    }
}
