//! Trading decision agent

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use agent_workflow::StageWeights;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::StockConfig;
use crate::market_data::MarketRegime;
use crate::scoring::{
    NEUTRAL_SCORE, clamp_confidence, clamp_score, mean, recommendation_for, scores, spread,
    weighted_mean,
};

/// Confidence of a decision taken without any supporting analysis
const BLIND_CONFIDENCE: f64 = 0.2;

/// Agent turning the team's opinions into a trading decision
///
/// Scores of earlier opinions are blended with the same per-family weights
/// the aggregator uses. Without any prior opinion the trader still decides,
/// holding with low confidence.
pub struct Trader {
    config: Arc<StockConfig>,
    weights: StageWeights,
}

impl Trader {
    pub const NAME: &'static str = "trader";

    pub fn new(config: Arc<StockConfig>) -> Self {
        Self {
            config,
            weights: StageWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: StageWeights) -> Self {
        self.weights = weights;
        self
    }

    fn decide(&self, context: &AnalysisContext) -> Opinion {
        let prior = context.prior_opinions();
        let weighted = weighted_mean(
            prior
                .iter()
                .filter_map(|o| o.score.map(|s| (s, self.weights.weight(o.source_kind)))),
        );

        let Some(weighted) = weighted else {
            return Opinion::new(
                Self::NAME,
                SourceKind::Trader,
                format!(
                    "No supporting analysis is available for {}; holding until there is.",
                    context.subject_name()
                ),
            )
            .with_score(NEUTRAL_SCORE)
            .with_confidence(BLIND_CONFIDENCE)
            .with_recommendation(recommendation_for(NEUTRAL_SCORE))
            .with_risk("Decision taken without supporting analysis");
        };

        let score = clamp_score(weighted);
        let all_scores = scores(prior);
        let confidences: Vec<f64> = prior.iter().filter_map(|o| o.confidence).collect();
        let mut confidence =
            mean(&confidences).unwrap_or(0.5) * (1.0 - spread(&all_scores) / 200.0);

        let recommendation = recommendation_for(score);
        let mut opinion = Opinion::new(
            Self::NAME,
            SourceKind::Trader,
            format!(
                "Blending {} opinions on {} gives a weighted score of {score:.1}. \
                 Decision: {recommendation}.",
                all_scores.len(),
                context.subject_name(),
            ),
        )
        .with_score(score)
        .with_recommendation(recommendation)
        .with_insight(format!(
            "Weighted score {score:.1} from {} scored opinions",
            all_scores.len()
        ))
        .with_supporting_data("weighted_score", score)
        .with_supporting_data("position_bias", f64::from(recommendation.stance()) / 2.0);

        let bull = context
            .prior_opinions_from(SourceKind::Researcher)
            .find(|o| o.source_name.contains("bull"))
            .and_then(|o| o.score);
        let bear = context
            .prior_opinions_from(SourceKind::Researcher)
            .find(|o| o.source_name.contains("bear"))
            .and_then(|o| o.score);
        if let (Some(bull), Some(bear)) = (bull, bear) {
            opinion
                .key_insights
                .push(format!("Bull/bear debate gap {:.1} points", bull - bear));
        }

        if MarketRegime::of(context) == MarketRegime::HighVolatility {
            confidence *= self.config.volatility_confidence_factor;
            opinion
                .risks
                .push("Elevated volatility, reduce position size".to_string());
        }

        opinion.with_confidence(clamp_confidence(confidence))
    }
}

#[async_trait]
impl Agent for Trader {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.decide(context))
    }
}
