//! News sentiment agent

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use async_trait::async_trait;

use crate::error::{Result, StockError};
use crate::market_data::{keys, series};
use crate::scoring::{NEUTRAL_SCORE, clamp_confidence, clamp_score, mean, recommendation_for, spread};

const POSITIVE_THRESHOLD: f64 = 0.2;
const NEGATIVE_THRESHOLD: f64 = -0.2;
/// Articles needed before coverage is considered adequate
const MIN_ARTICLES: usize = 3;

/// Agent that scores news flow from per-article sentiment
pub struct NewsAnalyst;

impl NewsAnalyst {
    pub const NAME: &'static str = "news_analyst";

    pub fn new() -> Self {
        Self
    }

    fn evaluate(&self, context: &AnalysisContext) -> Result<Opinion> {
        let sentiment: Vec<f64> = series(context, keys::NEWS_SENTIMENT)?
            .into_iter()
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(-1.0, 1.0))
            .collect();
        let average = mean(&sentiment)
            .ok_or_else(|| StockError::unavailable(context.subject_id(), "no usable sentiment"))?;

        let total = sentiment.len();
        let positive = sentiment.iter().filter(|&&s| s > POSITIVE_THRESHOLD).count();
        let negative = sentiment.iter().filter(|&&s| s < NEGATIVE_THRESHOLD).count();

        let score = clamp_score(NEUTRAL_SCORE + average * 40.0);
        // wide disagreement between articles halves confidence at most
        let coverage = (0.4 + 0.05 * total as f64).min(0.85);
        let confidence = clamp_confidence(coverage * (1.0 - spread(&sentiment) / 4.0));

        let mut risks = Vec::new();
        if negative as f64 > total as f64 * 0.4 {
            risks.push("Negative news flow".to_string());
        }
        if total < MIN_ARTICLES {
            risks.push("Thin news coverage".to_string());
        }

        let recommendation = recommendation_for(score);
        let narrative = format!(
            "{total} recent articles on {} carry an average sentiment of {average:+.2}. \
             News view: {recommendation}.",
            context.subject_name(),
        );

        let mut opinion = Opinion::new(Self::NAME, SourceKind::Analyst, narrative)
            .with_score(score)
            .with_confidence(confidence)
            .with_recommendation(recommendation)
            .with_insight(format!(
                "{positive} positive and {negative} negative of {total} articles"
            ))
            .with_insight(format!("Average news sentiment {average:+.2}"))
            .with_supporting_data("average_sentiment", average);
        opinion.risks = risks;
        Ok(opinion)
    }
}

impl Default for NewsAnalyst {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for NewsAnalyst {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.evaluate(context)?)
    }
}
