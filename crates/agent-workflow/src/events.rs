//! Pipeline event hooks

use async_trait::async_trait;

use crate::error::AgentFailure;
use crate::stage::StageResult;

/// Event handler for pipeline execution events
///
/// Implement this trait to receive callbacks while a pipeline runs, e.g. to
/// stream stage progress to a client or to write an audit trail. Every method
/// defaults to doing nothing.
#[async_trait]
pub trait PipelineObserver: Send + Sync {
    /// Called before the agents of a stage are launched
    async fn on_stage_start(&self, _stage: &str, _agent_count: usize) {}

    /// Called once for every agent that failed or timed out
    async fn on_agent_failed(&self, _failure: &AgentFailure) {}

    /// Called after every agent of a stage has settled
    async fn on_stage_complete(&self, _result: &StageResult) {}
}

/// No-op observer for when events are not needed
pub struct NoOpObserver;

#[async_trait]
impl PipelineObserver for NoOpObserver {}
