//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Ticker;

/// Daily OHLCV bar.
/// Uses f64 for fast indicator calculations; a missing upstream value is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Calculate the true range (used for ATR and ADX).
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                if hl.is_nan() || hc.is_nan() || lc.is_nan() {
                    return f64::NAN;
                }
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

impl Default for Bar {
    fn default() -> Self {
        Self {
            timestamp: 0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0.0,
        }
    }
}

/// Time-ordered daily series for one ticker.
///
/// Timestamps are strictly increasing. The series is immutable once built; a new
/// request produces a new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Ticker the bars belong to
    pub ticker: Ticker,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting by timestamp and keeping the last bar of any
    /// duplicated timestamp.
    pub fn new(ticker: Ticker, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            ticker,
            bars: deduped,
        }
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last N bars.
    pub fn last_n(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Keep only bars at or after `start_millis`.
    pub fn since(self, start_millis: i64) -> Self {
        let bars = self
            .bars
            .into_iter()
            .filter(|b| b.timestamp >= start_millis)
            .collect();
        Self {
            ticker: self.ticker,
            bars,
        }
    }

    /// Extract timestamps as a vector.
    pub fn timestamps(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Whether the volume column carries information: at least one finite,
    /// non-zero value. All-zero and all-missing columns do not.
    pub fn has_volume(&self) -> bool {
        self.bars
            .iter()
            .any(|b| b.volume.is_finite() && b.volume != 0.0)
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> Ticker {
        Ticker::parse("AAPL").unwrap()
    }

    #[test]
    fn test_bar_calculations() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.typical_price() - 103.333333).abs() < 0.001);
    }

    #[test]
    fn test_bar_true_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        // Without previous close
        assert!((bar.true_range(None) - 15.0).abs() < 0.001);

        // With previous close that creates gap
        assert!((bar.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = BarSeries::new(
            ticker(),
            vec![
                Bar::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0),
                Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.8, 1000.0),
            ],
        );

        assert_eq!(series.timestamps(), vec![1, 2, 3]);
        assert_eq!(series.get(1).unwrap().close, 101.8);
    }

    #[test]
    fn test_series_extractions() {
        let series = BarSeries::new(
            ticker(),
            vec![
                Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0),
            ],
        );

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.volumes(), vec![1000.0, 2000.0]);
        assert_eq!(series.last_n(1)[0].timestamp, 2);
        assert_eq!(series.clone().since(2).len(), 1);
    }

    #[test]
    fn test_has_volume() {
        let zeros = BarSeries::new(
            ticker(),
            vec![
                Bar::new(1, 1.0, 1.0, 1.0, 1.0, 0.0),
                Bar::new(2, 1.0, 1.0, 1.0, 1.0, f64::NAN),
            ],
        );
        assert!(!zeros.has_volume());

        let some = BarSeries::new(
            ticker(),
            vec![
                Bar::new(1, 1.0, 1.0, 1.0, 1.0, 0.0),
                Bar::new(2, 1.0, 1.0, 1.0, 1.0, 500.0),
            ],
        );
        assert!(some.has_volume());
    }
}
