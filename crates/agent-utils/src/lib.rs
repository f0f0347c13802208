//! Shared utilities for the stock orchestrator workspace
//!
//! This crate provides common functionality used across the workspace:
//! logging setup and process-level configuration.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{init_tracing, init_tracing_with};
