//! Trend strength indicators.

use serde::{Deserialize, Serialize};
use stockta_core::traits::OhlcvIndicator;
use stockta_core::types::Bar;

use crate::moving_average::wilder_smoothing;

/// Directional movement output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdxOutput {
    /// Average Directional Index
    pub adx: f64,
    /// Positive directional indicator (+DI)
    pub plus_di: f64,
    /// Negative directional indicator (-DI)
    pub minus_di: f64,
}

/// Average Directional Index (Wilder).
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Create a new ADX, commonly 14 periods.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// +DI and -DI series, defined from bar index `period`.
    pub fn directional(&self, bars: &[Bar]) -> Vec<(f64, f64)> {
        if bars.len() < self.period + 1 {
            return vec![];
        }

        let mut tr = Vec::with_capacity(bars.len() - 1);
        let mut plus_dm = Vec::with_capacity(bars.len() - 1);
        let mut minus_dm = Vec::with_capacity(bars.len() - 1);

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);
            let up_move = bar.high - prev.high;
            let down_move = prev.low - bar.low;

            if up_move.is_nan() || down_move.is_nan() {
                plus_dm.push(f64::NAN);
                minus_dm.push(f64::NAN);
            } else {
                plus_dm.push(if up_move > down_move && up_move > 0.0 {
                    up_move
                } else {
                    0.0
                });
                minus_dm.push(if down_move > up_move && down_move > 0.0 {
                    down_move
                } else {
                    0.0
                });
            }
            tr.push(bar.true_range(Some(prev.close)));
        }

        let smoothed_tr = wilder_smoothing(&tr, self.period);
        let smoothed_plus = wilder_smoothing(&plus_dm, self.period);
        let smoothed_minus = wilder_smoothing(&minus_dm, self.period);

        smoothed_tr
            .iter()
            .zip(smoothed_plus.iter().zip(smoothed_minus.iter()))
            .map(|(&atr, (&plus, &minus))| {
                if atr == 0.0 {
                    (0.0, 0.0)
                } else {
                    (100.0 * plus / atr, 100.0 * minus / atr)
                }
            })
            .collect()
    }
}

impl OhlcvIndicator for Adx {
    type Output = AdxOutput;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<AdxOutput> {
        let di = self.directional(bars);
        if di.len() < self.period {
            return vec![];
        }

        let dx: Vec<f64> = di
            .iter()
            .map(|&(plus, minus)| {
                let sum = plus + minus;
                if sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus - minus).abs() / sum
                }
            })
            .collect();

        let adx = wilder_smoothing(&dx, self.period);
        di[self.period - 1..]
            .iter()
            .zip(adx.iter())
            .map(|(&(plus_di, minus_di), &adx)| AdxOutput {
                adx,
                plus_di,
                minus_di,
            })
            .collect()
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

/// Commodity Channel Index.
///
/// `(TP - SMA(TP)) / (0.015 * mean absolute deviation)` over typical prices.
#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
}

impl Cci {
    const CONSTANT: f64 = 0.015;

    /// Create a new CCI, commonly 20 periods.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl OhlcvIndicator for Cci {
    type Output = f64;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        if bars.len() < self.period {
            return vec![];
        }

        let typical: Vec<f64> = bars.iter().map(Bar::typical_price).collect();
        let period_f64 = self.period as f64;

        typical
            .windows(self.period)
            .map(|window| {
                let mean = window.iter().sum::<f64>() / period_f64;
                let deviation = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period_f64;
                let tp = window[window.len() - 1];
                if deviation == 0.0 {
                    0.0
                } else {
                    (tp - mean) / (Self::CONSTANT * deviation)
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CCI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_bars(n: usize, step: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let mid = 100.0 + i as f64 * step;
                Bar::new(i as i64, mid, mid + 1.0, mid - 1.0, mid, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_adx_alignment() {
        let adx = Adx::new(14);
        let bars = trending_bars(60, 0.5);

        assert_eq!(adx.directional(&bars).len(), 60 - 14);
        assert_eq!(adx.calculate_bars(&bars).len(), 60 - 27);
    }

    #[test]
    fn test_adx_uptrend() {
        let adx = Adx::new(14);
        let result = adx.calculate_bars(&trending_bars(60, 0.5));
        let last = result.last().unwrap();

        assert!(last.plus_di > last.minus_di);
        assert!(last.adx > 50.0);
        assert!(last.adx <= 100.0);
    }

    #[test]
    fn test_adx_insufficient_data() {
        let adx = Adx::new(14);
        assert!(adx.calculate_bars(&trending_bars(20, 1.0)).is_empty());
    }

    #[test]
    fn test_cci_flat_is_zero() {
        let cci = Cci::new(20);
        let result = cci.calculate_bars(&trending_bars(25, 0.0));

        assert_eq!(result.len(), 6);
        assert!(result.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_cci_known_value() {
        let cci = Cci::new(3);
        // Typical prices 1, 2, 3 (high = low = close)
        let bars: Vec<Bar> = [1.0, 2.0, 3.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| Bar::new(i as i64, p, p, p, p, 0.0))
            .collect();

        let result = cci.calculate_bars(&bars);
        // mean 2, MAD 2/3 -> (3 - 2) / (0.015 * 2/3) = 100
        assert!((result[0] - 100.0).abs() < 1e-9);
    }
}
