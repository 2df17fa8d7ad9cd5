//! Data source trait definitions.

use crate::error::DataError;
use crate::types::{BarSeries, LookbackPeriod, Ticker};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// A request for daily history.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Ticker to fetch
    pub ticker: Ticker,
    /// Calendar days of history ending at `end`
    pub lookback_days: u32,
    /// End of the window (inclusive)
    pub end: DateTime<Utc>,
}

impl FetchRequest {
    /// Create a request ending now.
    pub fn new(ticker: Ticker, lookback_days: u32) -> Self {
        Self {
            ticker,
            lookback_days,
            end: Utc::now(),
        }
    }

    /// Create a request for a named period ending now.
    pub fn for_period(ticker: Ticker, period: LookbackPeriod) -> Self {
        Self::new(ticker, period.days())
    }

    /// Pin the end of the window.
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = end;
        self
    }

    /// Start of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.end - Duration::days(i64::from(self.lookback_days))
    }
}

/// Trait for historical daily data sources.
///
/// A source either returns a non-empty, normalized series or a classified
/// failure (`Transport`, `EmptyResult`, `MalformedSchema`). Fallback between
/// sources is the caller's concern.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch daily bars for the request window, ordered from oldest to newest.
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
