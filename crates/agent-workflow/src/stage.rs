//! Stage definition and the concurrent stage runner

use agent_core::{Agent, AgentError, AnalysisContext, Opinion, SourceKind};
use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::AgentFailure;
use crate::events::{NoOpObserver, PipelineObserver};

/// A named group of agents run concurrently against the same context
#[derive(Clone)]
pub struct Stage {
    name: String,
    kind: SourceKind,
    agents: Vec<Arc<dyn Agent>>,
    critical: bool,
}

impl Stage {
    /// Create an empty, non-critical stage
    pub fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            agents: Vec::new(),
            critical: false,
        }
    }

    /// Add an agent to the stage
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents to the stage, keeping their order
    pub fn with_agents<I>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Agent>>,
    {
        self.agents.extend(agents);
        self
    }

    /// Mark the stage as critical
    ///
    /// A critical stage without a single successful agent aborts the pipeline.
    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "agents",
                &self.agents.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("critical", &self.critical)
            .finish()
    }
}

/// Outcome of running one stage
///
/// `opinions` holds the successes in the order the agents were registered,
/// `failures` one entry per agent that errored, timed out or returned a
/// malformed opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub kind: SourceKind,
    pub opinions: Vec<Opinion>,
    pub failures: Vec<AgentFailure>,
    pub elapsed_ms: u64,
}

impl StageResult {
    /// Result of a stage with no agents configured
    pub fn skipped(stage: &Stage) -> Self {
        Self {
            stage: stage.name().to_string(),
            kind: stage.kind(),
            opinions: Vec::new(),
            failures: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Number of agents the stage ran
    pub fn agent_count(&self) -> usize {
        self.opinions.len() + self.failures.len()
    }

    /// A stage that contributes nothing to downstream contexts
    pub fn is_degraded(&self) -> bool {
        self.opinions.is_empty()
    }

    /// Fraction of agents that succeeded, 0 for a skipped stage
    pub fn success_rate(&self) -> f64 {
        let total = self.agent_count();
        if total == 0 {
            return 0.0;
        }
        self.opinions.len() as f64 / total as f64
    }
}

/// Runs all agents of a stage concurrently and waits for every one to settle
///
/// Each agent invocation gets its own timeout and its own failure isolation:
/// an error, timeout, panic or malformed opinion from one agent is recorded as
/// that agent's failure and never affects its siblings. Agents are polled in
/// place rather than spawned, so dropping the returned future cancels every
/// in-flight agent at its next suspension point.
pub struct StageRunner {
    agent_timeout: Duration,
    observer: Arc<dyn PipelineObserver>,
}

impl StageRunner {
    /// Create a new stage runner
    pub fn new(agent_timeout: Duration) -> Self {
        Self {
            agent_timeout,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Set the observer notified about stage progress
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn agent_timeout(&self) -> Duration {
        self.agent_timeout
    }

    /// Run every agent of `stage` against `context`
    pub async fn run(&self, stage: &Stage, context: &AnalysisContext) -> StageResult {
        if stage.is_empty() {
            debug!(stage = stage.name(), "No agents configured, skipping stage");
            return StageResult::skipped(stage);
        }

        info!(
            stage = stage.name(),
            agents = stage.agents().len(),
            prior_opinions = context.prior_opinions().len(),
            "Starting stage"
        );
        self.observer
            .on_stage_start(stage.name(), stage.agents().len())
            .await;

        let started = Instant::now();
        let outcomes = join_all(
            stage
                .agents()
                .iter()
                .map(|agent| self.invoke(agent.as_ref(), stage.kind(), context)),
        )
        .await;

        let mut opinions = Vec::new();
        let mut failures = Vec::new();

        for (agent, outcome) in stage.agents().iter().zip(outcomes) {
            match outcome {
                Ok(opinion) => opinions.push(opinion),
                Err(error) => {
                    warn!(
                        stage = stage.name(),
                        agent = agent.name(),
                        error = %error,
                        "Agent failed"
                    );
                    let failure = AgentFailure::new(stage.name(), agent.name(), error);
                    self.observer.on_agent_failed(&failure).await;
                    failures.push(failure);
                }
            }
        }

        let result = StageResult {
            stage: stage.name().to_string(),
            kind: stage.kind(),
            opinions,
            failures,
            elapsed_ms: duration_ms(started.elapsed()),
        };

        info!(
            stage = stage.name(),
            succeeded = result.opinions.len(),
            failed = result.failures.len(),
            elapsed_ms = result.elapsed_ms,
            "Stage complete"
        );
        self.observer.on_stage_complete(&result).await;

        result
    }

    /// Invoke a single agent with timeout, panic isolation and validation
    ///
    /// An agent that blocks its thread past the deadline is only noticed once
    /// it returns; whatever it produced is then discarded as a timeout.
    async fn invoke(
        &self,
        agent: &dyn Agent,
        kind: SourceKind,
        context: &AnalysisContext,
    ) -> Result<Opinion, AgentError> {
        let call = AssertUnwindSafe(agent.analyze(context)).catch_unwind();

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.agent_timeout, call).await;
        if started.elapsed() > self.agent_timeout {
            return Err(self.timeout_error());
        }

        let mut opinion = match outcome {
            Ok(Ok(result)) => result?,
            Ok(Err(panic)) => {
                return Err(AgentError::Other(format!(
                    "agent panicked: {}",
                    panic_message(panic.as_ref())
                )));
            }
            Err(_) => return Err(self.timeout_error()),
        };

        opinion.validate()?;

        if opinion.source_kind != kind {
            debug!(
                agent = agent.name(),
                reported = %opinion.source_kind,
                stage_kind = %kind,
                "Opinion kind does not match its stage, using the stage kind"
            );
            opinion.source_kind = kind;
        }

        Ok(opinion)
    }

    fn timeout_error(&self) -> AgentError {
        AgentError::Timeout {
            timeout_ms: duration_ms(self.agent_timeout),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
