//! Score helpers shared by the stock agents
//!
//! Scores live on a 0..=100 scale where 50 is neutral.

use agent_core::{Opinion, Recommendation};

pub const NEUTRAL_SCORE: f64 = 50.0;

/// Map a score onto a discrete recommendation
pub fn recommendation_for(score: f64) -> Recommendation {
    if score >= 80.0 {
        Recommendation::StrongBuy
    } else if score >= 60.0 {
        Recommendation::Buy
    } else if score > 40.0 {
        Recommendation::Hold
    } else if score > 20.0 {
        Recommendation::Sell
    } else {
        Recommendation::StrongSell
    }
}

/// Clamp into the valid score range, mapping NaN to neutral
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        NEUTRAL_SCORE
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Clamp into the valid confidence range, mapping NaN to zero
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Bounded contribution of a signal to a score
pub fn contribution(value: f64, limit: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-limit, limit)
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Max minus min, zero for fewer than two values
pub fn spread(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if values.len() < 2 { 0.0 } else { max - min }
}

/// Scores of the opinions that carry one
pub fn scores<'a>(opinions: impl IntoIterator<Item = &'a Opinion>) -> Vec<f64> {
    opinions.into_iter().filter_map(|o| o.score).collect()
}

/// Weighted mean of `(value, weight)` pairs, `None` when the weights sum to zero
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (sum, weights) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(s, w), (value, weight)| (s + value * weight, w + weight));
    if weights > 0.0 { Some(sum / weights) } else { None }
}
