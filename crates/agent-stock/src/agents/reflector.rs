//! Reflection agent reviewing the whole team

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use async_trait::async_trait;

use crate::error::{Result, StockError};
use crate::scoring::{NEUTRAL_SCORE, clamp_confidence, clamp_score, mean, recommendation_for, scores, spread};

/// Consistency below which the reflector flags a divided team
const LOW_CONSISTENCY: f64 = 0.6;

/// Agent reviewing every earlier opinion for internal consistency
///
/// Publishes `team_consistency` (1 minus the normalised score spread) and
/// tempers the trading decision toward neutral when the team disagrees.
pub struct Reflector;

impl Reflector {
    pub const NAME: &'static str = "reflector";

    pub fn new() -> Self {
        Self
    }

    fn evaluate(&self, context: &AnalysisContext) -> Result<Opinion> {
        let prior = context.prior_opinions();
        if prior.is_empty() {
            return Err(StockError::unavailable(
                context.subject_id(),
                "nothing to reflect on",
            ));
        }

        let team_scores = scores(prior);
        let consistency = clamp_confidence(1.0 - spread(&team_scores) / 100.0);

        let trader_scores = scores(context.prior_opinions_from(SourceKind::Trader));
        let decision = mean(&trader_scores)
            .or_else(|| mean(&team_scores))
            .unwrap_or(NEUTRAL_SCORE);
        let analyst_view = mean(&scores(context.prior_opinions_from(SourceKind::Analyst)));

        let score = clamp_score(NEUTRAL_SCORE + (decision - NEUTRAL_SCORE) * (0.5 + 0.5 * consistency));
        let recommendation = recommendation_for(score);

        let mut opinion = Opinion::new(
            Self::NAME,
            SourceKind::Reflector,
            format!(
                "Reviewed {} opinions on {} with a team consistency of {consistency:.2}. \
                 Reflected view: {recommendation}.",
                prior.len(),
                context.subject_name(),
            ),
        )
        .with_score(score)
        .with_confidence(clamp_confidence(0.3 + 0.6 * consistency))
        .with_recommendation(recommendation)
        .with_insight(format!("Team consistency {consistency:.2}"))
        .with_supporting_data("team_consistency", consistency);

        if let Some(analyst_view) = analyst_view {
            let agrees = recommendation_for(analyst_view).stance().signum()
                == recommendation_for(decision).stance().signum();
            opinion.key_insights.push(format!(
                "Trading decision {} analyst consensus",
                if agrees { "is consistent with" } else { "diverges from" }
            ));
        }

        if consistency < LOW_CONSISTENCY {
            opinion.risks.push("Team views diverge widely".to_string());
        }
        if context.prior_opinions_from(SourceKind::Researcher).next().is_none() {
            opinion.risks.push("No research debate took place".to_string());
        }

        Ok(opinion)
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for Reflector {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.evaluate(context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, DataValue, Recommendation, TimeRange};

    fn opinion(name: &str, kind: SourceKind, score: f64) -> Opinion {
        Opinion::new(name, kind, "view").with_score(score)
    }

    fn context(opinions: Vec<Opinion>) -> AnalysisContext {
        AnalysisContext::new("META", "Meta Platforms", TimeRange::last_days(30))
            .with_prior_opinions(opinions)
    }

    #[tokio::test]
    async fn test_consistent_team() {
        let ctx = context(vec![
            opinion("technical", SourceKind::Analyst, 70.0),
            opinion("bull_researcher", SourceKind::Researcher, 75.0),
            opinion("trader", SourceKind::Trader, 72.0),
        ]);

        let reflection = Reflector::new().analyze(&ctx).await.unwrap();

        let consistency = reflection
            .supporting_data
            .get("team_consistency")
            .and_then(DataValue::as_f64)
            .unwrap();
        assert!((consistency - 0.95).abs() < 1e-9);
        // 50 + 22 * 0.975
        assert!((reflection.score.unwrap() - 71.45).abs() < 1e-9);
        assert_eq!(reflection.recommendation, Some(Recommendation::Buy));
        assert!(reflection.risks.is_empty());
        assert!(
            reflection
                .key_insights
                .contains(&"Trading decision is consistent with analyst consensus".to_string())
        );
    }

    #[tokio::test]
    async fn test_divided_team_is_tempered() {
        let ctx = context(vec![
            opinion("technical", SourceKind::Analyst, 15.0),
            opinion("trader", SourceKind::Trader, 90.0),
        ]);

        let reflection = Reflector::new().analyze(&ctx).await.unwrap();

        // consistency 0.25: 50 + 40 * 0.625
        assert!((reflection.score.unwrap() - 75.0).abs() < 1e-9);
        assert!((reflection.confidence.unwrap() - 0.45).abs() < 1e-9);
        assert_eq!(
            reflection.risks,
            vec!["Team views diverge widely", "No research debate took place"]
        );
        assert!(
            reflection
                .key_insights
                .contains(&"Trading decision diverges from analyst consensus".to_string())
        );
    }

    #[tokio::test]
    async fn test_nothing_to_reflect_on() {
        let err = Reflector::new().analyze(&context(Vec::new())).await.unwrap_err();
        assert!(matches!(err, AgentError::DataUnavailable(_)));
    }
}
