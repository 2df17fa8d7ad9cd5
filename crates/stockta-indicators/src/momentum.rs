//! Momentum indicators.

use serde::{Deserialize, Serialize};
use stockta_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use stockta_core::types::Bar;

use crate::moving_average::{wilder_smoothing, Ema, Sma};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 30.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn from_averages(gain: f64, loss: f64) -> f64 {
        if !gain.is_finite() || !loss.is_finite() {
            return f64::NAN;
        }
        if gain == 0.0 && loss == 0.0 {
            // No movement at all in the window
            return 50.0;
        }
        if loss == 0.0 {
            return 100.0;
        }
        (100.0 - (100.0 / (1.0 + gain / loss))).clamp(0.0, 100.0)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        // Calculate price changes
        let mut gains = Vec::with_capacity(data.len() - 1);
        let mut losses = Vec::with_capacity(data.len() - 1);

        for pair in data.windows(2) {
            let change = pair[1] - pair[0];
            if change.is_nan() {
                gains.push(f64::NAN);
                losses.push(f64::NAN);
            } else if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        let avg_gains = wilder_smoothing(&gains, self.period);
        let avg_losses = wilder_smoothing(&losses, self.period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| Self::from_averages(gain, loss))
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    /// MACD line alone, defined from input index `slow - 1`.
    pub fn macd_line(&self, data: &[f64]) -> Vec<f64> {
        let fast_ema = Ema::new(self.fast_period).calculate(data);
        let slow_ema = Ema::new(self.slow_period).calculate(data);
        if slow_ema.is_empty() {
            return vec![];
        }

        // Align the EMAs (fast has more values)
        let offset = self.slow_period - self.fast_period;
        fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect()
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        let macd_line = self.macd_line(data);
        if macd_line.len() < self.signal_period {
            return vec![];
        }

        // Signal line (EMA of MACD)
        let signal_line = Ema::new(self.signal_period).calculate(&macd_line);

        let offset = self.signal_period - 1;
        macd_line[offset..]
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Highest high and lowest low of a window, ignoring NaN.
fn window_extremes(window: &[Bar]) -> (f64, f64) {
    let highest = window
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    (highest, lowest)
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (fast stochastic)
    pub k: f64,
    /// %D (slow stochastic / signal)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// Compares closing price to the price range over a period.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator with default parameters (14, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0);
        Self { k_period, d_period }
    }

    /// Raw %K values, defined from bar index `k_period - 1`.
    pub fn percent_k(&self, bars: &[Bar]) -> Vec<f64> {
        bars.windows(self.k_period)
            .map(|window| {
                let (highest, lowest) = window_extremes(window);
                let close = window[window.len() - 1].close;
                let range = highest - lowest;
                if range == 0.0 {
                    50.0 // Undefined, use midpoint
                } else {
                    ((close - lowest) / range) * 100.0
                }
            })
            .collect()
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for Stochastic {
    type Output = StochasticOutput;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<StochasticOutput> {
        let k_values = self.percent_k(bars);
        if k_values.len() < self.d_period {
            return vec![];
        }

        // %D is the SMA of %K
        let d_values = Sma::new(self.d_period).calculate(&k_values);
        k_values[self.d_period - 1..]
            .iter()
            .zip(d_values.iter())
            .map(|(&k, &d)| StochasticOutput { k, d })
            .collect()
    }

    fn period(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Williams %R.
///
/// `-100 * (highest high - close) / (highest high - lowest low)`, in [-100, 0].
#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
}

impl WilliamsR {
    /// Create a new Williams %R, commonly 14 periods.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl OhlcvIndicator for WilliamsR {
    type Output = f64;

    fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        bars.windows(self.period)
            .map(|window| {
                let (highest, lowest) = window_extremes(window);
                let close = window[window.len() - 1].close;
                let range = highest - lowest;
                if range == 0.0 {
                    -50.0
                } else {
                    -100.0 * (highest - close) / range
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Williams %R"
    }
}

/// Rate of Change, in percent.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
}

impl Roc {
    /// Create a new ROC over `period` bars.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Roc {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        data[self.period..]
            .iter()
            .zip(data.iter())
            .map(|(&current, &past)| {
                if past == 0.0 {
                    f64::NAN
                } else {
                    (current - past) / past * 100.0
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ROC"
    }
}
