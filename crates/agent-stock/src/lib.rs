//! Heuristic stock analysis agents
//!
//! This crate provides a ready-made team for the staged orchestrator in
//! `agent-workflow`. Every agent reads typed market data from the analysis
//! context and never performs I/O:
//!
//! - `TechnicalAnalyst`: trend, momentum and RSI over closing prices
//! - `FundamentalAnalyst`: P/E ratio, revenue growth and profit margin
//! - `NewsAnalyst`: per-article news sentiment
//! - `Researcher`: bull or bear case built from analyst opinions
//! - `Trader`: weighted decision over every earlier opinion
//! - `Reflector`: team consistency review
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_core::TimeRange;
//! use agent_stock::{StockConfig, register_default_team};
//! use agent_workflow::{AnalysisRequest, Orchestrator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator =
//!     register_default_team(Orchestrator::builder(), Arc::new(StockConfig::default()))
//!         .build()?;
//!
//! let request = AnalysisRequest::new("AAPL", "Apple Inc.", TimeRange::last_days(30))
//!     .with_raw_data("pe_ratio", 28.5);
//! let result = orchestrator.run_quick_analysis(request).await?;
//! println!("{}", result.quick_summary.recommendation);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod scoring;
pub mod team;

pub use agents::{
    FundamentalAnalyst, NewsAnalyst, Reflector, Researcher, TechnicalAnalyst, Thesis, Trader,
};
pub use config::{StockConfig, StockConfigBuilder};
pub use error::{Result, StockError};
pub use team::register_default_team;
