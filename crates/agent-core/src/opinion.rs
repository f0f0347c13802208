//! Opinion types produced by agents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AgentError;
use crate::value::{DataMap, DataValue};

/// Discrete investment recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// All recommendations, most bullish first
    pub const ALL: [Recommendation; 5] = [
        Self::StrongBuy,
        Self::Buy,
        Self::Hold,
        Self::Sell,
        Self::StrongSell,
    ];

    /// Signed stance from +2 (strong buy) to -2 (strong sell)
    pub fn stance(self) -> i8 {
        match self {
            Self::StrongBuy => 2,
            Self::Buy => 1,
            Self::Hold => 0,
            Self::Sell => -1,
            Self::StrongSell => -2,
        }
    }

    /// Distance from HOLD; lower is more conservative
    pub fn aggressiveness(self) -> u8 {
        self.stance().unsigned_abs()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = AgentError;

    /// Accepts `STRONG_BUY`, `strong buy`, `Strong-Buy` and similar spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_uppercase() })
            .collect();

        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| AgentError::MalformedResponse(format!("unknown recommendation '{s}'")))
    }
}

/// Which agent family (and therefore which stage) produced an opinion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Analyst,
    Researcher,
    Trader,
    Reflector,
}

impl SourceKind {
    /// Priority used to break ties between equally frequent recommendations
    ///
    /// Decision opinions outrank research, research outranks analysts, and the
    /// reflector only decides a tie when nothing else does.
    pub fn tie_break_priority(self) -> u8 {
        match self {
            Self::Trader => 3,
            Self::Researcher => 2,
            Self::Analyst => 1,
            Self::Reflector => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyst => "analyst",
            Self::Researcher => "researcher",
            Self::Trader => "trader",
            Self::Reflector => "reflector",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The successful output of one agent invocation
///
/// A failed agent produces no opinion at all, so every `Opinion` in the system
/// carries a non-empty narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub source_name: String,
    pub source_kind: SourceKind,
    pub narrative: String,
    /// Rating from 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Self-reported confidence from 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<String>,
    pub produced_at: DateTime<Utc>,
    /// Cross-agent signals such as a team consistency score
    #[serde(default, skip_serializing_if = "DataMap::is_empty")]
    pub supporting_data: DataMap,
}

impl Opinion {
    pub fn new(
        source_name: impl Into<String>,
        source_kind: SourceKind,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_kind,
            narrative: narrative.into(),
            score: None,
            confidence: None,
            recommendation: None,
            key_insights: Vec::new(),
            risks: Vec::new(),
            produced_at: Utc::now(),
            supporting_data: DataMap::new(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }

    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.key_insights.push(insight.into());
        self
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risks.push(risk.into());
        self
    }

    pub fn with_supporting_data(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.supporting_data.insert(key.into(), value.into());
        self
    }

    pub fn produced_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.produced_at = timestamp;
        self
    }

    /// Check that the opinion is well formed
    ///
    /// The source name and narrative must be non-empty, the score must lie in
    /// 0..=100 and the confidence in 0.0..=1.0.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.source_name.trim().is_empty() {
            return Err(AgentError::MalformedResponse(
                "opinion has an empty source name".to_string(),
            ));
        }

        if self.narrative.trim().is_empty() {
            return Err(AgentError::MalformedResponse(format!(
                "opinion from '{}' has an empty narrative",
                self.source_name
            )));
        }

        if let Some(score) = self.score.filter(|s| !(0.0..=100.0).contains(s)) {
            return Err(AgentError::MalformedResponse(format!(
                "score {score} from '{}' is outside 0..=100",
                self.source_name
            )));
        }

        if let Some(confidence) = self.confidence.filter(|c| !(0.0..=1.0).contains(c)) {
            return Err(AgentError::MalformedResponse(format!(
                "confidence {confidence} from '{}' is outside 0..=1",
                self.source_name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_parse() {
        assert_eq!("STRONG_BUY".parse::<Recommendation>().unwrap(), Recommendation::StrongBuy);
        assert_eq!("strong sell".parse::<Recommendation>().unwrap(), Recommendation::StrongSell);
        assert_eq!(" hold ".parse::<Recommendation>().unwrap(), Recommendation::Hold);
        assert_eq!("Strong-Buy".parse::<Recommendation>().unwrap(), Recommendation::StrongBuy);
        assert!("accumulate".parse::<Recommendation>().is_err());
    }

    #[test]
    fn test_recommendation_serde() {
        let json = serde_json::to_string(&Recommendation::StrongSell).unwrap();
        assert_eq!(json, "\"STRONG_SELL\"");

        let parsed: Recommendation = serde_json::from_str("\"BUY\"").unwrap();
        assert_eq!(parsed, Recommendation::Buy);
    }

    #[test]
    fn test_aggressiveness() {
        assert_eq!(Recommendation::Hold.aggressiveness(), 0);
        assert_eq!(Recommendation::Buy.aggressiveness(), 1);
        assert_eq!(Recommendation::Sell.aggressiveness(), 1);
        assert_eq!(Recommendation::StrongSell.aggressiveness(), 2);
    }

    #[test]
    fn test_tie_break_priority_order() {
        assert!(SourceKind::Trader.tie_break_priority() > SourceKind::Researcher.tie_break_priority());
        assert!(SourceKind::Researcher.tie_break_priority() > SourceKind::Analyst.tie_break_priority());
        assert!(SourceKind::Analyst.tie_break_priority() > SourceKind::Reflector.tie_break_priority());
    }

    #[test]
    fn test_opinion_builder() {
        let opinion = Opinion::new("technical", SourceKind::Analyst, "Uptrend intact")
            .with_score(72.0)
            .with_confidence(0.8)
            .with_recommendation(Recommendation::Buy)
            .with_insight("Price above 50-day average")
            .with_risk("Overbought RSI")
            .with_supporting_data("rsi", 71.0);

        assert_eq!(opinion.score, Some(72.0));
        assert_eq!(opinion.key_insights.len(), 1);
        assert_eq!(opinion.supporting_data["rsi"].as_f64(), Some(71.0));
        assert!(opinion.validate().is_ok());
    }

    #[test]
    fn test_opinion_validation() {
        let empty_narrative = Opinion::new("a", SourceKind::Analyst, "  ");
        assert!(empty_narrative.validate().is_err());

        let empty_name = Opinion::new("", SourceKind::Analyst, "text");
        assert!(empty_name.validate().is_err());

        let bad_score = Opinion::new("a", SourceKind::Analyst, "text").with_score(140.0);
        assert!(bad_score.validate().is_err());

        let bad_confidence = Opinion::new("a", SourceKind::Analyst, "text").with_confidence(-0.1);
        assert!(bad_confidence.validate().is_err());

        let nan_score = Opinion::new("a", SourceKind::Analyst, "text").with_score(f64::NAN);
        assert!(nan_score.validate().is_err());
    }

    #[test]
    fn test_opinion_serde_skips_empty_fields() {
        let opinion = Opinion::new("trader", SourceKind::Trader, "Buy the dip");
        let json = serde_json::to_value(&opinion).unwrap();

        assert_eq!(json["source_kind"], "trader");
        assert!(json.get("score").is_none());
        assert!(json.get("risks").is_none());

        let back: Opinion = serde_json::from_value(json).unwrap();
        assert_eq!(back, opinion);
    }
}
