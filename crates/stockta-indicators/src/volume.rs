//! Volume-based indicators.

use stockta_core::traits::OhlcvIndicator;
use stockta_core::types::Bar;

/// On-Balance Volume.
///
/// Starts at the first bar's volume and adds (subtracts) each later volume on
/// an up (down) close. Equal closes leave it unchanged. Defined on every bar.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    /// Create a new OBV.
    pub fn new() -> Self {
        Self
    }
}

impl OhlcvIndicator for Obv {
    type Output = f64;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        let Some(first) = bars.first() else {
            return vec![];
        };

        let mut result = Vec::with_capacity(bars.len());
        let mut running = if first.volume.is_finite() {
            first.volume
        } else {
            0.0
        };
        result.push(first.volume);

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);
            let change = bar.close - prev.close;
            if change.is_nan() || !bar.volume.is_finite() {
                result.push(f64::NAN);
                continue;
            }
            if change > 0.0 {
                running += bar.volume;
            } else if change < 0.0 {
                running -= bar.volume;
            }
            result.push(running);
        }

        result
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "OBV"
    }
}

/// Money Flow Index: a volume-weighted RSI over typical prices.
#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
}

impl Mfi {
    /// Create a new MFI, commonly 14 periods.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl OhlcvIndicator for Mfi {
    type Output = f64;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        if bars.len() <= self.period {
            return vec![];
        }

        // Signed raw money flow per bar change: (positive, negative)
        let flows: Vec<(f64, f64)> = bars
            .windows(2)
            .map(|pair| {
                let prev_tp = pair[0].typical_price();
                let tp = pair[1].typical_price();
                let flow = tp * pair[1].volume;
                if tp.is_nan() || prev_tp.is_nan() || flow.is_nan() {
                    (f64::NAN, f64::NAN)
                } else if tp > prev_tp {
                    (flow, 0.0)
                } else if tp < prev_tp {
                    (0.0, flow)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();

        flows
            .windows(self.period)
            .map(|window| {
                let positive: f64 = window.iter().map(|f| f.0).sum();
                let negative: f64 = window.iter().map(|f| f.1).sum();
                if positive.is_nan() || negative.is_nan() {
                    f64::NAN
                } else if positive == 0.0 && negative == 0.0 {
                    50.0
                } else if negative == 0.0 {
                    100.0
                } else {
                    100.0 - 100.0 / (1.0 + positive / negative)
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "MFI"
    }
}
