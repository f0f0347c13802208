//! Core abstractions for staged stock analysis
//!
//! This crate defines the data model shared by every analysis agent and by the
//! orchestration layer:
//!
//! - [`Agent`]: the single capability every pluggable analysis unit implements
//! - [`AnalysisContext`]: the immutable snapshot handed to all agents of a stage
//! - [`Opinion`]: the scored output of one successful agent invocation
//! - [`DataValue`]: typed values for the open-ended data bags
//! - [`AgentError`]: failures raised by a single agent invocation

pub mod agent;
pub mod context;
pub mod error;
pub mod opinion;
pub mod value;

pub use agent::Agent;
pub use context::{AnalysisContext, TimeRange};
pub use error::{AgentError, Result};
pub use opinion::{Opinion, Recommendation, SourceKind};
pub use value::{DataMap, DataValue};
