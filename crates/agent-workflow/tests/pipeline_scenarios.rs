//! End-to-end pipeline scenarios with scripted agents

use agent_core::{
    Agent, AgentError, AnalysisContext, Opinion, Recommendation, SourceKind, TimeRange,
};
use agent_workflow::orchestrator::stages;
use agent_workflow::{
    AgentFailure, AnalysisRequest, Orchestrator, OrchestratorConfig, PipelineError,
    PipelineObserver, StageResult,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Agent with a scripted outcome that records the prior opinions it saw
struct ScriptedAgent {
    name: String,
    kind: SourceKind,
    recommendation: Option<Recommendation>,
    score: Option<f64>,
    fail: bool,
    delay: Option<Duration>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    fn new(name: &str, kind: SourceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            recommendation: None,
            score: None,
            fail: false,
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn recommends(mut self, rec: Recommendation, score: f64) -> Self {
        self.recommendation = Some(rec);
        self.score = Some(score);
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        *self.seen.lock().unwrap() = context
            .prior_opinions()
            .iter()
            .map(|o| o.source_name.clone())
            .collect();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(AgentError::DataUnavailable(format!(
                "{} has no data for {}",
                self.name,
                context.subject_id()
            )));
        }

        let mut opinion = Opinion::new(
            &self.name,
            self.kind,
            format!("{} view on {}", self.name, context.subject_name()),
        )
        .with_insight(format!("{} insight", self.name))
        .with_risk("Macro slowdown");
        opinion.recommendation = self.recommendation;
        opinion.score = self.score;
        Ok(opinion)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("agent_workflow=debug")
        .with_test_writer()
        .try_init();
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(30))
        .with_metadata("market_regime", "normal")
        .with_raw_data("pe_ratio", 28.5)
}

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig::builder()
        .agent_timeout(Duration::from_millis(300))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_full_pipeline_one_analyst_fails() {
    init_tracing();
    let technical = Arc::new(
        ScriptedAgent::new("technical", SourceKind::Analyst).recommends(Recommendation::Buy, 70.0),
    );
    let fundamental = Arc::new(ScriptedAgent::new("fundamental", SourceKind::Analyst).failing());
    let news = Arc::new(
        ScriptedAgent::new("news", SourceKind::Analyst).recommends(Recommendation::Hold, 55.0),
    );
    let bull = Arc::new(
        ScriptedAgent::new("bull", SourceKind::Researcher).recommends(Recommendation::Buy, 75.0),
    );
    let trader = Arc::new(
        ScriptedAgent::new("trader", SourceKind::Trader).recommends(Recommendation::Buy, 68.0),
    );
    let reflector = Arc::new(
        ScriptedAgent::new("reflector", SourceKind::Reflector)
            .recommends(Recommendation::Buy, 66.0),
    );

    let orchestrator = Orchestrator::builder()
        .analyst(technical.clone())
        .analyst(fundamental.clone())
        .analyst(news.clone())
        .researcher(bull.clone())
        .trader(trader.clone())
        .reflector(reflector.clone())
        .config(fast_config())
        .build()
        .unwrap();

    let result = orchestrator.run_full_analysis(request()).await.unwrap();

    assert_eq!(result.analyst_results.len(), 2);
    assert_eq!(result.research_results.len(), 1);
    assert_eq!(result.trading_results.len(), 1);
    assert_eq!(result.reflection_result.source_name, "reflector");
    assert_eq!(result.subject_id, "AAPL");
    assert!(!result.run_id.is_empty());

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].stage, stages::ANALYSTS);
    assert_eq!(result.failures[0].agent_name, "fundamental");
    assert!(result.is_degraded());

    // the failed analyst never reaches later stages
    assert_eq!(bull.seen(), vec!["technical", "news"]);
    assert_eq!(trader.seen(), vec!["technical", "news", "bull"]);
    assert_eq!(reflector.seen(), vec!["technical", "news", "bull", "trader"]);
    assert!(technical.seen().is_empty());

    assert_eq!(result.summary.opinion_count, 5);
    assert_eq!(result.summary.final_recommendation, Recommendation::Buy);
    assert_eq!(result.summary.major_risks, vec!["Macro slowdown"]);
}

#[tokio::test]
async fn test_full_pipeline_recommendation_mix() {
    let orchestrator = Orchestrator::builder()
        .analyst(Arc::new(
            ScriptedAgent::new("a1", SourceKind::Analyst).recommends(Recommendation::Buy, 70.0),
        ))
        .analyst(Arc::new(
            ScriptedAgent::new("a2", SourceKind::Analyst).recommends(Recommendation::Buy, 65.0),
        ))
        .researcher(Arc::new(
            ScriptedAgent::new("r1", SourceKind::Researcher).recommends(Recommendation::Hold, 50.0),
        ))
        .trader(Arc::new(
            ScriptedAgent::new("t1", SourceKind::Trader).recommends(Recommendation::Buy, 72.0),
        ))
        .reflector(Arc::new(
            ScriptedAgent::new("ref", SourceKind::Reflector)
                .recommends(Recommendation::StrongBuy, 85.0),
        ))
        .config(fast_config())
        .build()
        .unwrap();

    let result = orchestrator.run_full_analysis(request()).await.unwrap();
    let summary = &result.summary;

    assert_eq!(summary.dominant_recommendation, Some(Recommendation::Buy));
    assert!((summary.consensus - 0.6).abs() < 1e-9);
    // BUY 1.0 + 1.0 + 2.0 = 4.0, STRONG_BUY 2.5, HOLD 1.5
    assert_eq!(summary.final_recommendation, Recommendation::Buy);
    assert!((summary.average_score - 68.4).abs() < 1e-9);
    assert!((0.0..=1.0).contains(&summary.confidence));
    assert_eq!(summary.key_insights.len(), 5);
}

#[tokio::test]
async fn test_quick_pipeline_degrades_when_core_analysts_fail() {
    let decision = Arc::new(
        ScriptedAgent::new("decision", SourceKind::Trader).recommends(Recommendation::Hold, 50.0),
    );

    let orchestrator = Orchestrator::builder()
        .core_analyst(Arc::new(ScriptedAgent::new("technical", SourceKind::Analyst).failing()))
        .core_analyst(Arc::new(ScriptedAgent::new("news", SourceKind::Analyst).failing()))
        .analyst(Arc::new(
            ScriptedAgent::new("fundamental", SourceKind::Analyst)
                .recommends(Recommendation::Buy, 90.0),
        ))
        .trader(decision.clone())
        .reflector(Arc::new(ScriptedAgent::new("reflector", SourceKind::Reflector)))
        .config(fast_config())
        .build()
        .unwrap();

    let result = orchestrator.run_quick_analysis(request()).await.unwrap();

    assert!(result.core_results.is_empty());
    assert_eq!(result.trading_result.source_name, "decision");
    assert!(decision.seen().is_empty());
    // the decision agent's own score does not count toward the average
    assert!(result.quick_summary.average_score.abs() < f64::EPSILON);
    assert_eq!(result.quick_summary.recommendation, Recommendation::Hold);
    assert_eq!(result.failures.len(), 2);
    assert!(result.failures.iter().all(|f| f.stage == stages::CORE_ANALYSTS));
}

#[tokio::test]
async fn test_quick_pipeline_decision_failure_is_fatal() {
    let orchestrator = Orchestrator::builder()
        .core_analyst(Arc::new(
            ScriptedAgent::new("technical", SourceKind::Analyst)
                .recommends(Recommendation::Buy, 70.0),
        ))
        .trader(Arc::new(ScriptedAgent::new("decision", SourceKind::Trader).failing()))
        .reflector(Arc::new(ScriptedAgent::new("reflector", SourceKind::Reflector)))
        .config(fast_config())
        .build()
        .unwrap();

    let err = orchestrator.run_quick_analysis(request()).await.unwrap_err();

    match err {
        PipelineError::CriticalStageFailed { stage, failures } => {
            assert_eq!(stage, stages::DECISION);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].agent_name, "decision");
            assert!(matches!(failures[0].error, AgentError::DataUnavailable(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_full_pipeline_all_traders_fail() {
    init_tracing();
    let reflector = Arc::new(ScriptedAgent::new("reflector", SourceKind::Reflector));

    let orchestrator = Orchestrator::builder()
        .analyst(Arc::new(
            ScriptedAgent::new("technical", SourceKind::Analyst)
                .recommends(Recommendation::Buy, 70.0),
        ))
        .trader(Arc::new(ScriptedAgent::new("t1", SourceKind::Trader).failing()))
        .trader(Arc::new(
            ScriptedAgent::new("t2", SourceKind::Trader).delayed(Duration::from_secs(10)),
        ))
        .reflector(reflector.clone())
        .config(fast_config())
        .build()
        .unwrap();

    let err = orchestrator.run_full_analysis(request()).await.unwrap_err();

    assert_eq!(err.stage(), Some(stages::TRADERS));
    if let PipelineError::CriticalStageFailed { failures, .. } = &err {
        assert_eq!(failures.len(), 2);
        assert!(failures[1].error.is_timeout());
    }
    // the run stopped before the reflector
    assert!(reflector.seen().is_empty());
}

#[tokio::test]
async fn test_all_analysts_and_researchers_fail_but_pipeline_completes() {
    let trader = Arc::new(
        ScriptedAgent::new("trader", SourceKind::Trader).recommends(Recommendation::Sell, 35.0),
    );

    let orchestrator = Orchestrator::builder()
        .analyst(Arc::new(ScriptedAgent::new("a1", SourceKind::Analyst).failing()))
        .analyst(Arc::new(ScriptedAgent::new("a2", SourceKind::Analyst).failing()))
        .researcher(Arc::new(ScriptedAgent::new("r1", SourceKind::Researcher).failing()))
        .trader(trader.clone())
        .reflector(Arc::new(
            ScriptedAgent::new("reflector", SourceKind::Reflector)
                .recommends(Recommendation::Hold, 45.0),
        ))
        .config(fast_config())
        .build()
        .unwrap();

    let result = orchestrator.run_full_analysis(request()).await.unwrap();

    assert!(result.analyst_results.is_empty());
    assert!(result.research_results.is_empty());
    assert!(trader.seen().is_empty());
    assert_eq!(result.failures.len(), 3);
    assert!((result.summary.average_score - 40.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&result.summary.average_score));
}

#[derive(Default)]
struct StageLog {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl PipelineObserver for StageLog {
    async fn on_stage_start(&self, stage: &str, agent_count: usize) {
        self.events.lock().unwrap().push(format!("start:{stage}:{agent_count}"));
    }

    async fn on_agent_failed(&self, failure: &AgentFailure) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed:{}", failure.agent_name));
    }

    async fn on_stage_complete(&self, result: &StageResult) {
        self.events.lock().unwrap().push(format!("done:{}", result.stage));
    }
}

#[tokio::test]
async fn test_stages_run_strictly_in_order() {
    let log = Arc::new(StageLog::default());

    let orchestrator = Orchestrator::builder()
        .analyst(Arc::new(
            ScriptedAgent::new("slow-analyst", SourceKind::Analyst)
                .recommends(Recommendation::Buy, 60.0)
                .delayed(Duration::from_millis(50)),
        ))
        .analyst(Arc::new(ScriptedAgent::new("broken", SourceKind::Analyst).failing()))
        .researcher(Arc::new(
            ScriptedAgent::new("bear", SourceKind::Researcher).recommends(Recommendation::Sell, 40.0),
        ))
        .trader(Arc::new(
            ScriptedAgent::new("trader", SourceKind::Trader).recommends(Recommendation::Hold, 50.0),
        ))
        .reflector(Arc::new(
            ScriptedAgent::new("reflector", SourceKind::Reflector)
                .recommends(Recommendation::Hold, 50.0),
        ))
        .observer(log.clone())
        .config(fast_config())
        .build()
        .unwrap();

    orchestrator.run_full_analysis(request()).await.unwrap();

    let events = log.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start:analysts:2",
            "failed:broken",
            "done:analysts",
            "start:researchers:1",
            "done:researchers",
            "start:traders:1",
            "done:traders",
            "start:reflection:1",
            "done:reflection",
        ]
    );
}

/// Agent that flags when its in-flight call is dropped
struct CancellableAgent {
    cancelled: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>, bool);

impl Drop for DropFlag {
    fn drop(&mut self) {
        if !self.1 {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Agent for CancellableAgent {
    fn name(&self) -> &str {
        "cancellable"
    }

    async fn analyze(&self, _context: &AnalysisContext) -> agent_core::Result<Opinion> {
        let mut flag = DropFlag(Arc::clone(&self.cancelled), false);
        tokio::time::sleep(Duration::from_secs(30)).await;
        flag.1 = true;
        Ok(Opinion::new("cancellable", SourceKind::Analyst, "finished"))
    }
}

#[tokio::test]
async fn test_dropping_the_run_cancels_in_flight_agents() {
    let cancelled = Arc::new(AtomicBool::new(false));

    let orchestrator = Orchestrator::builder()
        .analyst(Arc::new(CancellableAgent {
            cancelled: Arc::clone(&cancelled),
        }))
        .trader(Arc::new(ScriptedAgent::new("trader", SourceKind::Trader)))
        .reflector(Arc::new(ScriptedAgent::new("reflector", SourceKind::Reflector)))
        .config(
            OrchestratorConfig::builder()
                .agent_timeout(Duration::from_secs(60))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        orchestrator.run_full_analysis(request()),
    )
    .await;

    assert!(outcome.is_err());
    assert!(cancelled.load(Ordering::SeqCst));
}
