//! Technical indicators over closing prices

use ta::{
    Next,
    indicators::{RelativeStrengthIndex, SimpleMovingAverage, StandardDeviation},
};

use crate::error::Result;

/// Snapshot of the indicators the technical analyst reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub last_price: f64,
    pub rsi: f64,
    pub fast_sma: f64,
    pub slow_sma: f64,
    /// Price change over the slow window, in percent
    pub momentum_pct: f64,
    /// Standard deviation of the slow window relative to its mean, in percent
    pub volatility_pct: f64,
}

impl IndicatorSnapshot {
    /// Compute every indicator over `closes`
    ///
    /// With fewer than `slow_period` points the averages cover what is there.
    pub fn compute(
        closes: &[f64],
        rsi_period: usize,
        fast_period: usize,
        slow_period: usize,
    ) -> Result<Self> {
        let mut rsi = RelativeStrengthIndex::new(rsi_period)?;
        let mut fast = SimpleMovingAverage::new(fast_period)?;
        let mut slow = SimpleMovingAverage::new(slow_period)?;
        let mut stddev = StandardDeviation::new(slow_period)?;

        let mut snapshot = Self {
            last_price: 0.0,
            rsi: 50.0,
            fast_sma: 0.0,
            slow_sma: 0.0,
            momentum_pct: 0.0,
            volatility_pct: 0.0,
        };
        let mut deviation = 0.0;

        for &close in closes {
            snapshot.last_price = close;
            let value = rsi.next(close);
            if value.is_finite() {
                snapshot.rsi = value;
            }
            snapshot.fast_sma = fast.next(close);
            snapshot.slow_sma = slow.next(close);
            deviation = stddev.next(close);
        }

        let window_start = closes
            .get(closes.len().saturating_sub(slow_period))
            .copied()
            .unwrap_or(snapshot.last_price);
        snapshot.momentum_pct = percent_change(window_start, snapshot.last_price);
        if deviation.is_finite() && snapshot.slow_sma.abs() > f64::EPSILON {
            snapshot.volatility_pct = deviation / snapshot.slow_sma * 100.0;
        }

        Ok(snapshot)
    }

    pub fn is_uptrend(&self) -> bool {
        self.fast_sma > self.slow_sma
    }

    pub fn is_overbought(&self) -> bool {
        self.rsi > 70.0
    }

    pub fn is_oversold(&self) -> bool {
        self.rsi < 30.0
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from.abs() < f64::EPSILON {
        0.0
    } else {
        (to - from) / from * 100.0
    }
}

/// Interpret an RSI value
pub fn interpret_rsi(rsi: f64) -> &'static str {
    if rsi > 70.0 {
        "Overbought - potential sell signal"
    } else if rsi < 30.0 {
        "Oversold - potential buy signal"
    } else {
        "Neutral"
    }
}
