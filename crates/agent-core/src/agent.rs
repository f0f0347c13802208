//! Core Agent trait definition

use crate::{AnalysisContext, Opinion, Result};
use async_trait::async_trait;

/// Core trait that all analysis agents must implement
///
/// An agent turns an [`AnalysisContext`] into an [`Opinion`] or fails with an
/// [`AgentError`](crate::AgentError). Analysts, researchers, traders and
/// reflectors all implement this same trait; which stage an agent belongs to
/// is decided by whoever registers it with the orchestrator.
///
/// Agents of one stage run concurrently against the same context, so an
/// implementation must treat the context as read-only and must not rely on
/// state shared with sibling agents.
///
/// Siblings are polled on the same task, so `analyze` must not block the
/// executor: move CPU-heavy or blocking work onto
/// `tokio::task::spawn_blocking`. A blocked agent stalls its whole stage and
/// is reported as timed out once it overruns its deadline.
///
/// # Example
///
/// ```
/// use agent_core::{Agent, AnalysisContext, Opinion, Recommendation, Result, SourceKind};
/// use async_trait::async_trait;
///
/// struct AlwaysHold;
///
/// #[async_trait]
/// impl Agent for AlwaysHold {
///     fn name(&self) -> &str {
///         "always-hold"
///     }
///
///     async fn analyze(&self, context: &AnalysisContext) -> Result<Opinion> {
///         Ok(Opinion::new(self.name(), SourceKind::Analyst, format!("No view on {}", context.subject_id()))
///             .with_recommendation(Recommendation::Hold))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Get the agent's name
    fn name(&self) -> &str;

    /// Analyze the context and produce an opinion
    async fn analyze(&self, context: &AnalysisContext) -> Result<Opinion>;
}
