//! Context propagation between stages

use agent_core::{AnalysisContext, Opinion};
use tracing::debug;

use crate::stage::StageResult;

/// Builds the input context of each stage
///
/// Starts from the request's first-stage context and, after every stage,
/// appends that stage's successful opinions. Contexts already handed out are
/// never modified: absorbing a stage produces a fresh snapshot.
#[derive(Debug, Clone)]
pub struct ContextAccumulator {
    current: AnalysisContext,
}

impl ContextAccumulator {
    pub fn new(initial: AnalysisContext) -> Self {
        Self { current: initial }
    }

    /// Context for the next stage to run
    pub fn context(&self) -> &AnalysisContext {
        &self.current
    }

    /// Record a finished stage
    ///
    /// Failures are dropped here; only successful opinions reach later stages.
    /// A degraded stage leaves the context as it was.
    pub fn absorb(&mut self, result: &StageResult) {
        if result.opinions.is_empty() {
            debug!(stage = %result.stage, "Stage contributed no opinions");
            return;
        }

        self.current = self
            .current
            .with_prior_opinions(result.opinions.iter().cloned());

        debug!(
            stage = %result.stage,
            added = result.opinions.len(),
            total = self.current.prior_opinions().len(),
            "Accumulated stage opinions"
        );
    }

    /// Every opinion accumulated so far, in stage order
    pub fn opinions(&self) -> &[Opinion] {
        self.current.prior_opinions()
    }
}
