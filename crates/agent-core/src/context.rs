//! Analysis context shared by all agents of a stage
//!
//! An [`AnalysisContext`] is built once per pipeline run and never mutated
//! after it has been handed to a stage. Each later stage receives a new
//! context produced by [`AnalysisContext::with_prior_opinions`], which shares
//! the pre-fetched data bags and appends the opinions of earlier stages.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::opinion::{Opinion, SourceKind};
use crate::value::{DataMap, DataValue};

/// Well-known metadata keys
pub mod keys {
    /// Market regime hint (e.g. "normal", "high_volatility")
    pub const MARKET_REGIME: &str = "market_regime";
    /// Relative sector performance over the time range
    pub const SECTOR_PERFORMANCE: &str = "sector_performance";
    /// Free-form regulatory notes
    pub const REGULATORY_NOTES: &str = "regulatory_notes";
}

/// Window of historical data relevant to an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range, swapping the bounds if they are reversed
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// The `days` days leading up to now
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self::new(end - Duration::days(days), end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Immutable snapshot passed to every agent of a stage
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    subject_id: String,
    subject_name: String,
    time_range: TimeRange,
    raw_data: Arc<DataMap>,
    metadata: Arc<DataMap>,
    prior_opinions: Arc<[Opinion]>,
}

impl AnalysisContext {
    /// Create a first-stage context with empty data bags
    pub fn new(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        time_range: TimeRange,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            time_range,
            raw_data: Arc::new(DataMap::new()),
            metadata: Arc::new(DataMap::new()),
            prior_opinions: Arc::from(Vec::new()),
        }
    }

    // =========== Builder Methods ===========

    /// Set the pre-fetched market, fundamental and news data
    pub fn with_raw_data(mut self, raw_data: DataMap) -> Self {
        self.raw_data = Arc::new(raw_data);
        self
    }

    /// Set the domain hints
    pub fn with_metadata(mut self, metadata: DataMap) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }

    /// Build the context for a later stage
    ///
    /// The returned context shares this context's data bags and sees this
    /// context's prior opinions followed by `opinions`, in order. `self` is
    /// left untouched, so agents still holding it are unaffected.
    pub fn with_prior_opinions<I>(&self, opinions: I) -> Self
    where
        I: IntoIterator<Item = Opinion>,
    {
        let prior_opinions: Vec<Opinion> = self
            .prior_opinions
            .iter()
            .cloned()
            .chain(opinions)
            .collect();

        Self {
            subject_id: self.subject_id.clone(),
            subject_name: self.subject_name.clone(),
            time_range: self.time_range,
            raw_data: Arc::clone(&self.raw_data),
            metadata: Arc::clone(&self.metadata),
            prior_opinions: Arc::from(prior_opinions),
        }
    }

    // =========== Accessors ===========

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn raw_data(&self) -> &DataMap {
        &self.raw_data
    }

    pub fn metadata(&self) -> &DataMap {
        &self.metadata
    }

    /// Opinions of every earlier stage, in stage order
    ///
    /// Empty for the first stage. Agents must not assume it is non-empty.
    pub fn prior_opinions(&self) -> &[Opinion] {
        &self.prior_opinions
    }

    /// Get a raw data value
    pub fn raw(&self, key: &str) -> Option<&DataValue> {
        self.raw_data.get(key)
    }

    /// Get a metadata value
    pub fn meta(&self, key: &str) -> Option<&DataValue> {
        self.metadata.get(key)
    }

    /// Get the market regime hint, if any
    pub fn market_regime(&self) -> Option<&str> {
        self.meta(keys::MARKET_REGIME).and_then(DataValue::as_str)
    }

    /// Prior opinions produced by one agent family
    pub fn prior_opinions_from(&self, kind: SourceKind) -> impl Iterator<Item = &Opinion> {
        self.prior_opinions
            .iter()
            .filter(move |opinion| opinion.source_kind == kind)
    }
}
