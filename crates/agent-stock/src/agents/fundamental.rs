//! Fundamental analysis agent

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::StockConfig;
use crate::error::Result;
use crate::market_data::{MarketRegime, keys, number, optional_number};
use crate::scoring::{NEUTRAL_SCORE, clamp_confidence, clamp_score, contribution, recommendation_for};

/// Agent specialized in fundamental analysis
///
/// Values the subject from its P/E ratio, and where available its revenue
/// growth and profit margin. Confidence grows with the number of metrics.
pub struct FundamentalAnalyst {
    config: Arc<StockConfig>,
}

impl FundamentalAnalyst {
    pub const NAME: &'static str = "fundamental_analyst";

    /// Create a new fundamental analyst
    pub fn new(config: Arc<StockConfig>) -> Self {
        Self { config }
    }

    fn evaluate(&self, context: &AnalysisContext) -> Result<Opinion> {
        let pe = number(context, keys::PE_RATIO)?;
        let growth = optional_number(context, keys::REVENUE_GROWTH);
        let margin = optional_number(context, keys::PROFIT_MARGIN);
        let fair_pe = self.config.fair_pe_ratio;

        let mut insights = Vec::new();
        let mut risks = Vec::new();
        let mut score = NEUTRAL_SCORE;

        if pe <= 0.0 {
            score -= 20.0;
            insights.push("Company reports negative earnings".to_string());
            risks.push("Negative earnings make the P/E ratio meaningless".to_string());
        } else {
            score += contribution((fair_pe - pe) / fair_pe * 25.0, 20.0);
            insights.push(format!("P/E {pe:.1} against a fair value of {fair_pe:.1}"));
            if pe > fair_pe * 1.5 {
                risks.push(format!("Valuation stretched at {pe:.1}x earnings"));
            }
        }

        if let Some(growth) = growth {
            score += contribution(growth * 100.0, 15.0);
            insights.push(format!("Revenue growth {:+.1}%", growth * 100.0));
            if growth < 0.0 {
                risks.push("Revenue is shrinking".to_string());
            }
        }

        if let Some(margin) = margin {
            score += contribution((margin - 0.10) * 100.0, 10.0);
            insights.push(format!("Profit margin {:.1}%", margin * 100.0));
            if margin < 0.0 {
                risks.push("Operating at a loss".to_string());
            }
        }

        let metrics = 1 + usize::from(growth.is_some()) + usize::from(margin.is_some());
        let mut confidence = 0.45 + 0.15 * metrics as f64;
        if MarketRegime::of(context) == MarketRegime::HighVolatility {
            confidence *= self.config.volatility_confidence_factor;
        }

        let score = clamp_score(score);
        let recommendation = recommendation_for(score);
        let narrative = format!(
            "{} is valued at {pe:.1}x earnings with {metrics} of 3 fundamental metrics \
             available. Fundamental view: {recommendation}.",
            context.subject_name(),
        );

        let mut opinion = Opinion::new(Self::NAME, SourceKind::Analyst, narrative)
            .with_score(score)
            .with_confidence(clamp_confidence(confidence))
            .with_recommendation(recommendation)
            .with_supporting_data("pe_ratio", pe);
        opinion.key_insights = insights;
        opinion.risks = risks;
        Ok(opinion)
    }
}

#[async_trait]
impl Agent for FundamentalAnalyst {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.evaluate(context)?)
    }
}
