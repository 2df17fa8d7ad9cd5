//! Point-in-time market readings derived from a series or frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use stockta_core::types::BarSeries;
use stockta_indicators::{ColumnId, IndicatorFrame};

/// Latest price and its change against the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Latest close
    pub price: f64,
    /// Previous close, absent for a single-bar series
    pub previous_close: Option<f64>,
    /// Absolute change against the previous close
    pub change: Option<f64>,
    /// Percent change against the previous close
    pub change_pct: Option<f64>,
    /// Latest volume, absent when missing upstream
    pub volume: Option<f64>,
    /// Timestamp of the latest bar (Unix ms)
    pub timestamp: i64,
}

impl MarketSnapshot {
    /// Build from the last two bars. `None` for an empty series or a
    /// non-finite latest close.
    pub fn from_series(series: &BarSeries) -> Option<Self> {
        let last = series.last()?;
        if !last.close.is_finite() {
            return None;
        }

        let previous_close = series
            .len()
            .checked_sub(2)
            .and_then(|i| series.get(i))
            .map(|b| b.close)
            .filter(|c| c.is_finite());

        let change = previous_close.map(|prev| last.close - prev);
        let change_pct = previous_close
            .zip(change)
            .filter(|(prev, _)| *prev != 0.0)
            .map(|(prev, change)| change / prev * 100.0);

        Some(Self {
            price: last.close,
            previous_close,
            change,
            change_pct,
            volume: Some(last.volume).filter(|v| v.is_finite()),
            timestamp: last.timestamp,
        })
    }
}

/// Recent support and resistance from the high/low of the last bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    /// Highest high of the window
    pub resistance: f64,
    /// Lowest low of the window
    pub support: f64,
    /// `(resistance - price) / price`, in percent
    pub distance_to_resistance_pct: f64,
    /// `(price - support) / price`, in percent
    pub distance_from_support_pct: f64,
    /// Number of bars the levels were taken from
    pub window: usize,
}

impl KeyLevels {
    /// Default window length in bars.
    pub const DEFAULT_WINDOW: usize = 20;

    /// Levels over the last `window` bars, relative to the latest close.
    pub fn from_series(series: &BarSeries, window: usize) -> Option<Self> {
        let price = series.last()?.close;
        if !price.is_finite() || price == 0.0 || window == 0 {
            return None;
        }

        let recent = series.last_n(window);
        let resistance = recent
            .iter()
            .map(|b| b.high)
            .filter(|h| h.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        let support = recent
            .iter()
            .map(|b| b.low)
            .filter(|l| l.is_finite())
            .fold(f64::INFINITY, f64::min);

        if !resistance.is_finite() || !support.is_finite() {
            return None;
        }

        Some(Self {
            resistance,
            support,
            distance_to_resistance_pct: (resistance - price) / price * 100.0,
            distance_from_support_pct: (price - support) / price * 100.0,
            window: recent.len(),
        })
    }
}

/// Relationship between SMA 20 and SMA 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossState {
    /// SMA 20 above SMA 50
    Golden,
    /// SMA 20 at or below SMA 50
    Death,
}

impl CrossState {
    /// Cross state of the latest row. Golden needs both averages; a missing
    /// average reads as Death, the same way the scorer's comparisons fail.
    pub fn from_frame(frame: &IndicatorFrame) -> Self {
        match (frame.latest(ColumnId::Sma20), frame.latest(ColumnId::Sma50)) {
            (Some(sma_20), Some(sma_50)) if sma_20 > sma_50 => CrossState::Golden,
            _ => CrossState::Death,
        }
    }
}

impl fmt::Display for CrossState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossState::Golden => write!(f, "Golden Cross"),
            CrossState::Death => write!(f, "Death Cross"),
        }
    }
}
