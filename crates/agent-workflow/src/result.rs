//! Pipeline request and result types

use agent_core::{AnalysisContext, DataMap, DataValue, Opinion, TimeRange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::{QuickSummary, Summary};
use crate::error::AgentFailure;

/// Input of a pipeline run
///
/// `raw_data` is filled by a data-gathering collaborator before the
/// orchestrator is invoked; the orchestrator never fetches data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub subject_id: String,
    pub subject_name: String,
    pub time_range: TimeRange,
    #[serde(default)]
    pub metadata: DataMap,
    #[serde(default)]
    pub raw_data: DataMap,
}

impl AnalysisRequest {
    pub fn new(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        time_range: TimeRange,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            time_range,
            metadata: DataMap::new(),
            raw_data: DataMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_raw_data(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.raw_data.insert(key.into(), value.into());
        self
    }

    /// First-stage context for this request
    pub fn into_context(self) -> AnalysisContext {
        AnalysisContext::new(self.subject_id, self.subject_name, self.time_range)
            .with_raw_data(self.raw_data)
            .with_metadata(self.metadata)
    }
}

/// Result of the full four-stage pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub analyst_results: Vec<Opinion>,
    pub research_results: Vec<Opinion>,
    pub trading_results: Vec<Opinion>,
    pub reflection_result: Opinion,
    pub summary: Summary,
    /// Every agent failure across all stages
    pub failures: Vec<AgentFailure>,
}

impl PipelineResult {
    /// All opinions in stage order
    pub fn all_opinions(&self) -> impl Iterator<Item = &Opinion> {
        self.analyst_results
            .iter()
            .chain(&self.research_results)
            .chain(&self.trading_results)
            .chain(std::iter::once(&self.reflection_result))
    }

    /// Whether any agent failed during the run
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of the quick two-stage pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickPipelineResult {
    pub run_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub core_results: Vec<Opinion>,
    pub trading_result: Opinion,
    pub quick_summary: QuickSummary,
    pub failures: Vec<AgentFailure>,
}

impl QuickPipelineResult {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}
