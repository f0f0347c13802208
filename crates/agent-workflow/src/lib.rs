//! Staged multi-agent orchestration for stock analysis
//!
//! This crate runs groups of agents ("stages") in a fixed order, threading the
//! opinions of earlier stages into the context of later ones, and reduces
//! every opinion into a single recommendation:
//!
//! - [`StageRunner`]: runs one stage's agents concurrently with per-agent
//!   timeout and failure isolation, then waits for all of them
//! - [`ContextAccumulator`]: builds each stage's context from the request and
//!   the successful opinions of all earlier stages
//! - [`Aggregator`]: pure reduction of opinions into a [`Summary`]
//! - [`Orchestrator`]: the full and quick pipelines over the primitives above

pub mod accumulator;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod result;
pub mod stage;

// Re-export for convenience
pub use accumulator::ContextAccumulator;
pub use aggregator::{Aggregator, QuickSummary, StageWeights, Summary};
pub use config::{OrchestratorConfig, OrchestratorConfigBuilder};
pub use error::{AgentFailure, PipelineError, Result};
pub use events::{NoOpObserver, PipelineObserver};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use result::{AnalysisRequest, PipelineResult, QuickPipelineResult};
pub use stage::{Stage, StageResult, StageRunner};
