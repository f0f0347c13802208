//! Orchestrator: the full and quick analysis pipelines
//!
//! Both pipelines are a stage manifest executed by the same engine: stages
//! run strictly one after another, each against a context carrying the
//! successful opinions of every earlier stage, and the aggregator reduces the
//! accumulated opinions at the end.

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::accumulator::ContextAccumulator;
use crate::aggregator::Aggregator;
use crate::config::OrchestratorConfig;
use crate::error::{PipelineError, Result};
use crate::events::{NoOpObserver, PipelineObserver};
use crate::result::{AnalysisRequest, PipelineResult, QuickPipelineResult};
use crate::stage::{Stage, StageResult, StageRunner};

/// Stage names used in results, logs and errors
pub mod stages {
    pub const ANALYSTS: &str = "analysts";
    pub const RESEARCHERS: &str = "researchers";
    pub const TRADERS: &str = "traders";
    pub const REFLECTION: &str = "reflection";
    pub const CORE_ANALYSTS: &str = "core_analysts";
    pub const DECISION: &str = "decision";
}

/// Runs staged multi-agent analysis
///
/// # Example
///
/// ```no_run
/// use agent_core::TimeRange;
/// use agent_workflow::{AnalysisRequest, Orchestrator};
/// use std::sync::Arc;
///
/// # async fn example(
/// #     technical: Arc<dyn agent_core::Agent>,
/// #     trader: Arc<dyn agent_core::Agent>,
/// #     reflector: Arc<dyn agent_core::Agent>,
/// # ) -> agent_workflow::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .core_analyst(technical)
///     .trader(trader)
///     .reflector(reflector)
///     .build()?;
///
/// let request = AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(30));
/// let result = orchestrator.run_full_analysis(request).await?;
/// println!("{}", result.summary.final_recommendation);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    full_manifest: Vec<Stage>,
    quick_manifest: Vec<Stage>,
    runner: StageRunner,
    aggregator: Aggregator,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Stages of the full pipeline, in execution order
    pub fn full_manifest(&self) -> &[Stage] {
        &self.full_manifest
    }

    /// Stages of the quick pipeline, in execution order
    pub fn quick_manifest(&self) -> &[Stage] {
        &self.quick_manifest
    }

    /// Run analysts, researchers, traders and the reflector, then aggregate
    ///
    /// Returns a complete result, possibly with fewer opinions than agents,
    /// or a [`PipelineError`] if the traders or the reflector all failed.
    pub async fn run_full_analysis(&self, request: AnalysisRequest) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let started = Instant::now();
        let subject_id = request.subject_id.clone();
        let subject_name = request.subject_name.clone();

        info!(run_id = %run_id, subject = %subject_id, "Starting full analysis");

        let results = self
            .execute(&self.full_manifest, request.into_context())
            .await?;
        let failures = collect_failures(&results);

        let [analysts, researchers, traders, reflection]: [StageResult; 4] =
            results.try_into().map_err(|_| {
                PipelineError::InvalidConfiguration("full manifest must have four stages".to_string())
            })?;

        let reflection_result = single_opinion(reflection)?;
        let all: Vec<Opinion> = analysts
            .opinions
            .iter()
            .chain(&researchers.opinions)
            .chain(&traders.opinions)
            .chain(std::iter::once(&reflection_result))
            .cloned()
            .collect();
        let summary = self.aggregator.summarize(&all);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            run_id = %run_id,
            subject = %subject_id,
            recommendation = %summary.final_recommendation,
            consensus = summary.consensus,
            failures = failures.len(),
            elapsed_ms,
            "Full analysis complete"
        );

        Ok(PipelineResult {
            run_id,
            subject_id,
            subject_name,
            started_at,
            elapsed_ms,
            analyst_results: analysts.opinions,
            research_results: researchers.opinions,
            trading_results: traders.opinions,
            reflection_result,
            summary,
            failures,
        })
    }

    /// Run the core analysts and a single decision agent, then aggregate
    ///
    /// The decision agent still runs when every core analyst failed; it then
    /// sees no prior opinions.
    pub async fn run_quick_analysis(&self, request: AnalysisRequest) -> Result<QuickPipelineResult> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let started = Instant::now();
        let subject_id = request.subject_id.clone();
        let subject_name = request.subject_name.clone();

        info!(run_id = %run_id, subject = %subject_id, "Starting quick analysis");

        let results = self
            .execute(&self.quick_manifest, request.into_context())
            .await?;
        let failures = collect_failures(&results);

        let [core, decision]: [StageResult; 2] = results.try_into().map_err(|_| {
            PipelineError::InvalidConfiguration("quick manifest must have two stages".to_string())
        })?;

        let trading_result = single_opinion(decision)?;
        let quick_summary = self
            .aggregator
            .summarize_quick(&core.opinions, &trading_result);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            run_id = %run_id,
            subject = %subject_id,
            recommendation = %quick_summary.recommendation,
            failures = failures.len(),
            elapsed_ms,
            "Quick analysis complete"
        );

        Ok(QuickPipelineResult {
            run_id,
            subject_id,
            subject_name,
            started_at,
            elapsed_ms,
            core_results: core.opinions,
            trading_result,
            quick_summary,
            failures,
        })
    }

    /// Run a manifest stage by stage
    ///
    /// Stage `i + 1` starts only after every agent of stage `i` has settled.
    /// A critical stage with no successes aborts the run; any other stage
    /// simply passes on whatever it produced, possibly nothing.
    async fn execute(&self, manifest: &[Stage], context: AnalysisContext) -> Result<Vec<StageResult>> {
        let mut accumulator = ContextAccumulator::new(context);
        let mut results = Vec::with_capacity(manifest.len());

        for stage in manifest {
            let result = self.runner.run(stage, accumulator.context()).await;

            if result.is_degraded() {
                if stage.is_critical() {
                    error!(
                        stage = stage.name(),
                        failures = result.failures.len(),
                        "Critical stage produced no opinions, aborting pipeline"
                    );
                    return Err(PipelineError::CriticalStageFailed {
                        stage: stage.name().to_string(),
                        failures: result.failures,
                    });
                }
                if !stage.is_empty() {
                    warn!(
                        stage = stage.name(),
                        failures = result.failures.len(),
                        "Stage degraded, continuing without its opinions"
                    );
                }
            }

            accumulator.absorb(&result);
            results.push(result);
        }

        Ok(results)
    }
}

fn collect_failures(results: &[StageResult]) -> Vec<crate::error::AgentFailure> {
    results
        .iter()
        .flat_map(|r| r.failures.iter().cloned())
        .collect()
}

/// The one opinion of a single-agent critical stage
fn single_opinion(result: StageResult) -> Result<Opinion> {
    let StageResult {
        stage,
        opinions,
        failures,
        ..
    } = result;

    opinions
        .into_iter()
        .next()
        .ok_or(PipelineError::CriticalStageFailed { stage, failures })
}

/// Builder for Orchestrator
///
/// Agents are registered per stage; registration order is the order opinions
/// appear in results.
pub struct OrchestratorBuilder {
    analysts: Vec<Arc<dyn Agent>>,
    core_analysts: Vec<Arc<dyn Agent>>,
    researchers: Vec<Arc<dyn Agent>>,
    traders: Vec<Arc<dyn Agent>>,
    reflectors: Vec<Arc<dyn Agent>>,
    quick_decision: Option<Arc<dyn Agent>>,
    config: OrchestratorConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl OrchestratorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            analysts: Vec::new(),
            core_analysts: Vec::new(),
            researchers: Vec::new(),
            traders: Vec::new(),
            reflectors: Vec::new(),
            quick_decision: None,
            config: OrchestratorConfig::default(),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Add an analyst to the full pipeline
    pub fn analyst(mut self, agent: Arc<dyn Agent>) -> Self {
        self.analysts.push(agent);
        self
    }

    /// Add an analyst to the full pipeline and to the quick pipeline
    pub fn core_analyst(mut self, agent: Arc<dyn Agent>) -> Self {
        self.core_analysts.push(Arc::clone(&agent));
        self.analysts.push(agent);
        self
    }

    /// Add a researcher
    pub fn researcher(mut self, agent: Arc<dyn Agent>) -> Self {
        self.researchers.push(agent);
        self
    }

    /// Add a trader
    pub fn trader(mut self, agent: Arc<dyn Agent>) -> Self {
        self.traders.push(agent);
        self
    }

    /// Set the reflector
    pub fn reflector(mut self, agent: Arc<dyn Agent>) -> Self {
        self.reflectors.push(agent);
        self
    }

    /// Set the decision agent of the quick pipeline (defaults to the first trader)
    pub fn quick_decision(mut self, agent: Arc<dyn Agent>) -> Self {
        self.quick_decision = Some(agent);
        self
    }

    /// Set the configuration
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the observer notified about stage progress
    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Configuration the orchestrator will be built with
    pub fn configuration(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        if self.traders.is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "at least one trader is required".to_string(),
            ));
        }

        let [reflector]: [Arc<dyn Agent>; 1] = self.reflectors.try_into().map_err(|r: Vec<_>| {
            PipelineError::InvalidConfiguration(format!(
                "exactly one reflector is required, got {}",
                r.len()
            ))
        })?;

        let core_analysts = if self.core_analysts.is_empty() {
            self.analysts
                .iter()
                .take(self.config.quick_core_analysts)
                .cloned()
                .collect()
        } else {
            self.core_analysts
        };

        let decision = match self.quick_decision {
            Some(agent) => agent,
            None => Arc::clone(&self.traders[0]),
        };

        let full_manifest = vec![
            Stage::new(stages::ANALYSTS, SourceKind::Analyst).with_agents(self.analysts),
            Stage::new(stages::RESEARCHERS, SourceKind::Researcher).with_agents(self.researchers),
            Stage::new(stages::TRADERS, SourceKind::Trader)
                .with_agents(self.traders)
                .critical(true),
            Stage::new(stages::REFLECTION, SourceKind::Reflector)
                .with_agent(reflector)
                .critical(true),
        ];

        let quick_manifest = vec![
            Stage::new(stages::CORE_ANALYSTS, SourceKind::Analyst).with_agents(core_analysts),
            Stage::new(stages::DECISION, SourceKind::Trader)
                .with_agent(decision)
                .critical(true),
        ];

        let runner = StageRunner::new(self.config.agent_timeout).with_observer(self.observer);
        let aggregator = Aggregator::new(self.config.stage_weights, self.config.max_summary_items);

        Ok(Orchestrator {
            full_manifest,
            quick_manifest,
            runner,
            aggregator,
            config: self.config,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
