//! Classic floor-trader pivot points.

use serde::{Deserialize, Serialize};
use stockta_core::traits::OhlcvIndicator;
use stockta_core::types::Bar;

/// Pivot point with three resistance and three support levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,
    pub r2: f64,
    pub s2: f64,
    pub r3: f64,
    pub s3: f64,
}

impl PivotLevels {
    /// Levels derived from one bar's high, low and close.
    pub fn from_bar(bar: &Bar) -> Self {
        let pivot = (bar.high + bar.low + bar.close) / 3.0;
        let range = bar.high - bar.low;
        Self {
            pivot,
            r1: 2.0 * pivot - bar.low,
            s1: 2.0 * pivot - bar.high,
            r2: pivot + range,
            s2: pivot - range,
            r3: bar.high + 2.0 * (pivot - bar.low),
            s3: bar.low - 2.0 * (bar.high - pivot),
        }
    }

    /// Whether every level is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.pivot, self.r1, self.s1, self.r2, self.s2, self.r3, self.s3,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Per-bar pivot levels.
#[derive(Debug, Clone, Default)]
pub struct Pivots;

impl OhlcvIndicator for Pivots {
    type Output = PivotLevels;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<PivotLevels> {
        bars.iter().map(PivotLevels::from_bar).collect()
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "Pivot Points"
    }
}
