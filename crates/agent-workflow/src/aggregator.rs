//! Reduction of all pipeline opinions into a single summary
//!
//! The aggregator is a pure function of its input: no I/O, no clock, and the
//! result does not depend on the order of opinions within a stage (except for
//! the first-seen order of insights and risks).

use agent_core::{Opinion, Recommendation, SourceKind};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Confidence assumed for an opinion that does not report one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Default cap on summary insights and risks
pub const DEFAULT_MAX_ITEMS: usize = 10;

const WEIGHT_EPSILON: f64 = 1e-9;

/// Weight of each agent family in the final recommendation and confidence
///
/// Later, better-informed stages weigh more, but a single reflector (2.5) can
/// never outvote two agreeing traders (2 x 2.0) on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageWeights {
    pub analyst: f64,
    pub researcher: f64,
    pub trader: f64,
    pub reflector: f64,
}

impl Default for StageWeights {
    fn default() -> Self {
        Self {
            analyst: 1.0,
            researcher: 1.5,
            trader: 2.0,
            reflector: 2.5,
        }
    }
}

impl StageWeights {
    pub fn weight(&self, kind: SourceKind) -> f64 {
        match kind {
            SourceKind::Analyst => self.analyst,
            SourceKind::Researcher => self.researcher,
            SourceKind::Trader => self.trader,
            SourceKind::Reflector => self.reflector,
        }
    }

    /// All weights must be finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [self.analyst, self.researcher, self.trader, self.reflector]
            .iter()
            .all(|w| w.is_finite() && *w > 0.0)
    }
}

/// Reduced view over every opinion of a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Mean score over opinions that have one, 0 if none do
    pub average_score: f64,
    /// Most frequent recommendation, `None` if no opinion has one
    pub dominant_recommendation: Option<Recommendation>,
    /// Share of recommending opinions that agree with the dominant one
    pub consensus: f64,
    /// Stage-weighted decision
    pub final_recommendation: Recommendation,
    /// Stage-weighted mean confidence
    pub confidence: f64,
    pub key_insights: Vec<String>,
    pub major_risks: Vec<String>,
    /// Number of opinions the summary was computed from
    pub opinion_count: usize,
}

/// The subset of [`Summary`] reported by the quick pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickSummary {
    pub average_score: f64,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub key_points: Vec<String>,
    pub main_risks: Vec<String>,
}

impl From<Summary> for QuickSummary {
    fn from(summary: Summary) -> Self {
        Self {
            average_score: summary.average_score,
            recommendation: summary.final_recommendation,
            confidence: summary.confidence,
            key_points: summary.key_insights,
            main_risks: summary.major_risks,
        }
    }
}

/// Votes cast for one recommendation
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: usize,
    /// Votes per source kind, indexed by tie-break priority
    by_priority: [usize; 4],
    weight: f64,
}

/// Reduces opinions into a [`Summary`]
#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: StageWeights,
    max_items: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(StageWeights::default(), DEFAULT_MAX_ITEMS)
    }
}

impl Aggregator {
    pub fn new(weights: StageWeights, max_items: usize) -> Self {
        Self { weights, max_items }
    }

    pub fn weights(&self) -> &StageWeights {
        &self.weights
    }

    /// Summarize every opinion produced by a pipeline run
    pub fn summarize(&self, opinions: &[Opinion]) -> Summary {
        let tallies = self.tally(opinions);
        let recommending: usize = tallies.iter().map(|t| t.count).sum();

        let dominant = dominant_recommendation(&tallies);
        let consensus = match dominant {
            Some(rec) if recommending > 0 => tallies[index(rec)].count as f64 / recommending as f64,
            _ => 0.0,
        };

        Summary {
            average_score: average_score(opinions),
            dominant_recommendation: dominant,
            consensus,
            final_recommendation: weighted_recommendation(&tallies),
            confidence: self.weighted_confidence(opinions),
            key_insights: collect_unique(
                opinions.iter().flat_map(|o| o.key_insights.iter()),
                self.max_items,
            ),
            major_risks: collect_unique(opinions.iter().flat_map(|o| o.risks.iter()), self.max_items),
            opinion_count: opinions.len(),
        }
    }

    /// Summarize a quick pipeline run
    ///
    /// The average score covers the data-gathering opinions only, so a run
    /// whose core analysts all failed reports 0 whatever the decision agent
    /// scored. Recommendation, confidence, key points and risks use every
    /// opinion, the decision included.
    pub fn summarize_quick(&self, core: &[Opinion], decision: &Opinion) -> QuickSummary {
        let all: Vec<Opinion> = core.iter().chain(std::iter::once(decision)).cloned().collect();
        QuickSummary {
            average_score: average_score(core),
            ..QuickSummary::from(self.summarize(&all))
        }
    }

    fn tally(&self, opinions: &[Opinion]) -> [Tally; 5] {
        let mut tallies = [Tally::default(); 5];

        for opinion in opinions {
            if let Some(rec) = opinion.recommendation {
                let tally = &mut tallies[index(rec)];
                tally.count += 1;
                tally.by_priority[usize::from(opinion.source_kind.tie_break_priority())] += 1;
                tally.weight += self.weights.weight(opinion.source_kind);
            }
        }

        tallies
    }

    fn weighted_confidence(&self, opinions: &[Opinion]) -> f64 {
        let (weighted, total) = opinions.iter().fold((0.0, 0.0), |(sum, total), opinion| {
            let weight = self.weights.weight(opinion.source_kind);
            let confidence = opinion.confidence.unwrap_or(DEFAULT_CONFIDENCE);
            (sum + weight * confidence, total + weight)
        });

        if total <= 0.0 {
            return DEFAULT_CONFIDENCE;
        }
        (weighted / total).clamp(0.0, 1.0)
    }
}

fn index(rec: Recommendation) -> usize {
    match rec {
        Recommendation::StrongBuy => 0,
        Recommendation::Buy => 1,
        Recommendation::Hold => 2,
        Recommendation::Sell => 3,
        Recommendation::StrongSell => 4,
    }
}

fn average_score(opinions: &[Opinion]) -> f64 {
    let scores: Vec<f64> = opinions.iter().filter_map(|o| o.score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    (scores.iter().sum::<f64>() / scores.len() as f64).clamp(0.0, 100.0)
}

/// Mode of the recommendations
///
/// Ties on count go to the recommendation backed by the higher-priority
/// stage (trader, then researcher, analyst, reflector). A tie that survives
/// that goes to the option closest to HOLD, then to the bearish side.
fn dominant_recommendation(tallies: &[Tally; 5]) -> Option<Recommendation> {
    Recommendation::ALL
        .into_iter()
        .filter(|rec| tallies[index(*rec)].count > 0)
        .max_by_key(|rec| {
            let t = &tallies[index(*rec)];
            (
                t.count,
                t.by_priority[3],
                t.by_priority[2],
                t.by_priority[1],
                t.by_priority[0],
                Reverse(rec.aggressiveness()),
                Reverse(rec.stance()),
            )
        })
}

/// Highest summed stage weight, ties resolved toward HOLD
fn weighted_recommendation(tallies: &[Tally; 5]) -> Recommendation {
    let best = tallies.iter().map(|t| t.weight).fold(0.0_f64, f64::max);
    if best <= 0.0 {
        return Recommendation::Hold;
    }

    let leaders: Vec<Recommendation> = Recommendation::ALL
        .into_iter()
        .filter(|rec| (tallies[index(*rec)].weight - best).abs() < WEIGHT_EPSILON)
        .collect();

    let calmest = leaders
        .iter()
        .map(|rec| rec.aggressiveness())
        .min()
        .unwrap_or(0);
    let mut most_conservative = leaders.iter().filter(|rec| rec.aggressiveness() == calmest);

    match (most_conservative.next(), most_conservative.next()) {
        (Some(rec), None) => *rec,
        // e.g. BUY and SELL tied with equal weight
        _ => Recommendation::Hold,
    }
}

/// First-seen, exact-match de-duplication capped at `max`
fn collect_unique<'a, I>(items: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if unique.len() >= max {
            break;
        }
        if item.trim().is_empty() {
            continue;
        }
        if seen.insert(item.as_str()) {
            unique.push(item.clone());
        }
    }

    unique
}
