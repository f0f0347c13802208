//! Bull and bear researchers
//!
//! Researchers do not read market data. They argue one side of the case from
//! the analyst opinions accumulated so far.

use agent_core::{Agent, AnalysisContext, Opinion, SourceKind};
use async_trait::async_trait;

use crate::error::{Result, StockError};
use crate::scoring::{NEUTRAL_SCORE, clamp_confidence, clamp_score, mean, recommendation_for, scores};

/// Side of the debate a researcher argues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thesis {
    Bull,
    Bear,
}

impl Thesis {
    /// Whether an analyst opinion supports this side
    fn supported_by(self, opinion: &Opinion) -> bool {
        let stance = match (opinion.recommendation, opinion.score) {
            (Some(rec), _) => rec.stance(),
            (None, Some(score)) if score >= 60.0 => 1,
            (None, Some(score)) if score <= 40.0 => -1,
            _ => 0,
        };
        match self {
            Self::Bull => stance > 0,
            Self::Bear => stance < 0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Bull => "bullish",
            Self::Bear => "bearish",
        }
    }
}

/// Researcher building the bull or the bear case
pub struct Researcher {
    thesis: Thesis,
}

impl Researcher {
    pub const BULL_NAME: &'static str = "bull_researcher";
    pub const BEAR_NAME: &'static str = "bear_researcher";

    pub fn bull() -> Self {
        Self {
            thesis: Thesis::Bull,
        }
    }

    pub fn bear() -> Self {
        Self {
            thesis: Thesis::Bear,
        }
    }

    pub fn thesis(&self) -> Thesis {
        self.thesis
    }

    fn evaluate(&self, context: &AnalysisContext) -> Result<Opinion> {
        let analysts: Vec<&Opinion> = context.prior_opinions_from(SourceKind::Analyst).collect();
        if analysts.is_empty() {
            return Err(StockError::unavailable(
                context.subject_id(),
                "no analyst opinions to research",
            ));
        }

        let supporting: Vec<&Opinion> = analysts
            .iter()
            .copied()
            .filter(|o| self.thesis.supported_by(o))
            .collect();
        let share = supporting.len() as f64 / analysts.len() as f64;
        let base = mean(&scores(analysts.iter().copied())).unwrap_or(NEUTRAL_SCORE);

        let tilt = 5.0 + 10.0 * share;
        let score = clamp_score(match self.thesis {
            Thesis::Bull => base + tilt,
            Thesis::Bear => base - tilt,
        });

        let confidences: Vec<f64> = analysts.iter().filter_map(|o| o.confidence).collect();
        let confidence = mean(&confidences).unwrap_or(0.5) * (0.6 + 0.4 * share);

        let mut opinion = Opinion::new(
            self.name(),
            SourceKind::Researcher,
            format!(
                "{} of {} analysts lean {} on {}. Starting from an analyst average of \
                 {base:.1}, the {} case scores {score:.1}.",
                supporting.len(),
                analysts.len(),
                self.thesis.label(),
                context.subject_name(),
                self.thesis.label(),
            ),
        )
        .with_score(score)
        .with_confidence(clamp_confidence(confidence))
        .with_recommendation(recommendation_for(score))
        .with_insight(format!(
            "{} of {} analysts lean {}",
            supporting.len(),
            analysts.len(),
            self.thesis.label()
        ))
        .with_supporting_data("supporting_share", share);

        match self.thesis {
            Thesis::Bull => {
                for analyst in &supporting {
                    if let Some(insight) = analyst.key_insights.first() {
                        opinion.key_insights.push(insight.clone());
                    }
                }
                if let Some(risk) = analysts.iter().flat_map(|o| o.risks.iter()).next() {
                    opinion.risks.push(format!("Bull case must overcome: {risk}"));
                }
            }
            Thesis::Bear => {
                for analyst in &analysts {
                    opinion.risks.extend(analyst.risks.iter().cloned());
                }
                opinion.risks.dedup();
            }
        }

        Ok(opinion)
    }
}

#[async_trait]
impl Agent for Researcher {
    fn name(&self) -> &str {
        match self.thesis {
            Thesis::Bull => Self::BULL_NAME,
            Thesis::Bear => Self::BEAR_NAME,
        }
    }

    async fn analyze(&self, context: &AnalysisContext) -> agent_core::Result<Opinion> {
        Ok(self.evaluate(context)?)
    }
}
