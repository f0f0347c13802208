//! Default analysis team

use agent_workflow::OrchestratorBuilder;
use std::sync::Arc;

use crate::agents::{FundamentalAnalyst, NewsAnalyst, Reflector, Researcher, TechnicalAnalyst, Trader};
use crate::config::StockConfig;

/// Register the default stock team on an orchestrator builder
///
/// Technical and fundamental analysts form the quick pipeline's core; the
/// news analyst only takes part in the full pipeline. The trader blends
/// scores with the stage weights already configured on `builder`, so set the
/// orchestrator config before registering the team.
pub fn register_default_team(
    builder: OrchestratorBuilder,
    config: Arc<StockConfig>,
) -> OrchestratorBuilder {
    let weights = builder.configuration().stage_weights;
    builder
        .core_analyst(Arc::new(TechnicalAnalyst::new(Arc::clone(&config))))
        .core_analyst(Arc::new(FundamentalAnalyst::new(Arc::clone(&config))))
        .analyst(Arc::new(NewsAnalyst::new()))
        .researcher(Arc::new(Researcher::bull()))
        .researcher(Arc::new(Researcher::bear()))
        .trader(Arc::new(Trader::new(config).with_weights(weights)))
        .reflector(Arc::new(Reflector::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{DataValue, TimeRange};
    use agent_workflow::{AnalysisRequest, Orchestrator, OrchestratorConfig, StageWeights};

    fn request() -> AnalysisRequest {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i) * 0.8).collect();
        AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(60))
            .with_metadata("market_regime", "normal")
            .with_raw_data("prices", prices)
            .with_raw_data("pe_ratio", 24.0)
            .with_raw_data("revenue_growth", 0.08)
            .with_raw_data("profit_margin", 0.22)
            .with_raw_data("news_sentiment", vec![0.4, 0.1, -0.3, 0.6])
    }

    fn orchestrator() -> Orchestrator {
        register_default_team(
            Orchestrator::builder(),
            Arc::new(StockConfig::default()),
        )
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_run_with_default_team() {
        let result = orchestrator().run_full_analysis(request()).await.unwrap();

        assert_eq!(result.analyst_results.len(), 3);
        assert_eq!(result.research_results.len(), 2);
        assert_eq!(result.trading_results.len(), 1);
        assert!(result.failures.is_empty());
        assert!(
            result
                .reflection_result
                .supporting_data
                .get("team_consistency")
                .and_then(DataValue::as_f64)
                .is_some()
        );
        assert!((0.0..=100.0).contains(&result.summary.average_score));
        assert!(result.summary.key_insights.len() <= 10);
    }

    #[tokio::test]
    async fn test_quick_run_without_market_data() {
        let bare = AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(60));

        let result = orchestrator().run_quick_analysis(bare).await.unwrap();

        assert!(result.core_results.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.trading_result.source_name, Trader::NAME);
        assert_eq!(
            result.quick_summary.recommendation,
            agent_core::Recommendation::Hold
        );
        assert!(result.quick_summary.average_score.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_trader_uses_configured_stage_weights() {
        let weights = StageWeights {
            researcher: 3.0,
            ..StageWeights::default()
        };
        let config = OrchestratorConfig::builder()
            .stage_weights(weights)
            .build()
            .unwrap();
        let orchestrator = register_default_team(
            Orchestrator::builder().config(config),
            Arc::new(StockConfig::default()),
        )
        .build()
        .unwrap();

        let result = orchestrator.run_full_analysis(request()).await.unwrap();

        let (sum, total) = result
            .analyst_results
            .iter()
            .chain(&result.research_results)
            .filter_map(|o| o.score.map(|s| (s, weights.weight(o.source_kind))))
            .fold((0.0, 0.0), |(sum, total), (s, w)| (sum + s * w, total + w));
        let trader_score = result.trading_results[0].score.unwrap();
        assert!((trader_score - sum / total).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_full_run_without_market_data_still_decides() {
        let bare = AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(60));

        let result = orchestrator().run_full_analysis(bare).await.unwrap();

        assert!(result.analyst_results.is_empty());
        // researchers have nothing to argue from
        assert!(result.research_results.is_empty());
        assert_eq!(result.failures.len(), 5);
        assert_eq!(result.trading_results.len(), 1);
    }
}
