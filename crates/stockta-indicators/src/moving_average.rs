//! Moving average indicators and the shared recursive smoothing helper.

use stockta_core::traits::Indicator;

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values. A window containing a
/// non-finite value yields NaN for that window only.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        let period_f64 = self.period as f64;
        let mut sum = 0.0;
        let mut missing = 0usize;

        for (i, &value) in data.iter().enumerate() {
            if value.is_finite() {
                sum += value;
            } else {
                missing += 1;
            }

            // Slide the window
            if i >= self.period {
                let old = data[i - self.period];
                if old.is_finite() {
                    sum -= old;
                } else {
                    missing -= 1;
                }
            }

            if i + 1 >= self.period {
                result.push(if missing == 0 { sum / period_f64 } else { f64::NAN });
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = price * k + prev * (1 - k)` with `k = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let k = self.multiplier;
        seeded_smoothing(data, self.period, |prev, price| price * k + prev * (1.0 - k))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

/// Recursive smoothing seeded with a simple average.
///
/// The seed is the mean of the first `period` finite values; after that each
/// finite value advances the state through `step`. A non-finite value produces
/// NaN at its own position and leaves the state untouched, so one bad bar does
/// not blank the rest of the series.
///
/// Output alignment matches the other batch indicators: `len - period + 1`
/// values, the first one belonging to input index `period - 1`.
pub(crate) fn seeded_smoothing<F>(values: &[f64], period: usize, step: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    if period == 0 || values.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let mut state: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;

    for (i, &value) in values.iter().enumerate() {
        let output = match state {
            None if value.is_finite() => {
                seed_sum += value;
                seed_count += 1;
                if seed_count == period {
                    let seed = seed_sum / period as f64;
                    state = Some(seed);
                    seed
                } else {
                    f64::NAN
                }
            }
            None => f64::NAN,
            Some(_) if !value.is_finite() => f64::NAN,
            Some(prev) => {
                let next = step(prev, value);
                state = Some(next);
                next
            }
        };

        if i + 1 >= period {
            result.push(output);
        }
    }

    result
}

/// Wilder's smoothing: `avg = (prev * (period - 1) + value) / period`.
pub(crate) fn wilder_smoothing(values: &[f64], period: usize) -> Vec<f64> {
    let period_f64 = period as f64;
    seeded_smoothing(values, period, |prev, value| {
        (prev * (period_f64 - 1.0) + value) / period_f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let sma = Sma::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma.calculate(&data);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[1] - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[2] - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let sma = Sma::new(5);
        let result = sma.calculate(&[1.0, 2.0, 3.0]);

        assert!(result.is_empty());
    }

    #[test]
    fn test_sma_missing_value_is_local() {
        let sma = Sma::new(2);
        let data = vec![1.0, f64::NAN, 3.0, 5.0, 7.0];
        let result = sma.calculate(&data);

        assert_eq!(result.len(), 4);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!((result[2] - 4.0).abs() < 1e-10);
        assert!((result[3] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema() {
        let ema = Ema::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ema.calculate(&data);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 1e-10); // Initial SMA
        // mult = 2/(3+1) = 0.5
        // result[1] = 4 * 0.5 + 2 * 0.5 = 3.0
        assert!((result[1] - 3.0).abs() < 1e-10);
        assert!((result[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_is_sma_seeded() {
        // Seeding from the first value would give 10 * 0.5^3 = 1.25 at row 2
        let ema = Ema::new(3);
        let result = ema.calculate(&[10.0, 0.0, 0.0, 0.0]);

        assert_eq!(result.len(), 2);
        assert!((result[0] - 10.0 / 3.0).abs() < 1e-10);
        assert!((result[1] - 5.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_skips_missing_value() {
        let ema = Ema::new(2);
        let data = vec![2.0, 4.0, f64::NAN, 6.0];
        let result = ema.calculate(&data);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 3.0).abs() < 1e-10);
        assert!(result[1].is_nan());
        // k = 2/3: 6 * 2/3 + 3 * 1/3 = 5
        assert!((result[2] - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_wilder_smoothing() {
        let result = wilder_smoothing(&[2.0, 4.0, 6.0, 8.0], 2);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 3.0).abs() < 1e-10);
        assert!((result[1] - 4.5).abs() < 1e-10); // (3 + 6) / 2
        assert!((result[2] - 6.25).abs() < 1e-10); // (4.5 + 8) / 2
    }
}
