//! Indicator trait definitions.

use crate::types::Bar;

/// Trait for technical indicators over a single price column.
///
/// `calculate` returns only defined values: the output is shorter than the
/// input by the warm-up length, and its last element lines up with the last
/// input element.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically prices)
    ///
    /// # Returns
    /// A vector of indicator values, empty when `data` is too short
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Multi-output indicator (e.g., Bollinger Bands, MACD).
///
/// Some indicators produce multiple related values.
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple values.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// OHLCV indicator that uses whole bars (not just close).
///
/// Same alignment contract as [`Indicator`]: the last output belongs to the
/// last bar.
pub trait OhlcvIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from bars ordered oldest first.
    fn calculate_bars(&self, bars: &[Bar]) -> Vec<Self::Output>;

    /// Get the minimum number of bars required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        type Output = f64;

        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            if data.len() < self.period {
                return vec![];
            }
            // Simple sum indicator for testing
            data.windows(self.period)
                .map(|w| w.iter().sum())
                .collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    struct RangeIndicator;

    impl OhlcvIndicator for RangeIndicator {
        type Output = f64;

        fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
            bars.iter().map(|b| b.high - b.low).collect()
        }

        fn period(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "range"
        }
    }

    #[test]
    fn test_short_input_yields_nothing() {
        let indicator = TestIndicator { period: 5 };

        assert!(indicator.calculate(&[1.0, 2.0, 3.0]).is_empty());
        assert_eq!(indicator.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]).len(), 1);
    }

    #[test]
    fn test_indicator_calculate() {
        let indicator = TestIndicator { period: 3 };
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = indicator.calculate(&data);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 6.0).abs() < 0.001); // 1+2+3
        assert!((result[2] - 12.0).abs() < 0.001); // 3+4+5
    }

    #[test]
    fn test_ohlcv_indicator_aligns_with_bars() {
        let bars = [
            Bar::new(1, 1.0, 2.0, 0.5, 1.5, 10.0),
            Bar::new(2, 1.5, 3.0, 1.0, 2.5, 12.0),
        ];
        let out = RangeIndicator.calculate_bars(&bars);
        assert_eq!(out.len(), bars.len());
        assert_eq!(out.last(), Some(&2.0));
        assert_eq!(RangeIndicator.period(), 2);
    }
}
