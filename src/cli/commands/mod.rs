//! CLI command implementations.

pub mod analyze;
pub mod indicators;
pub mod tickers;
pub mod validate;

use anyhow::{Context, Result};
use stockta_config::AppConfig;
use stockta_core::traits::FetchRequest;
use stockta_core::types::{BarSeries, CompanyProfile, LookbackPeriod, Ticker};
use stockta_data::{MarketDataAdapter, SeriesCache};

/// Data access shared by the commands of one invocation.
pub struct Session {
    adapter: MarketDataAdapter,
    cache: SeriesCache,
    default_period: LookbackPeriod,
}

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let adapter = MarketDataAdapter::from_settings(&config.providers)
            .context("Failed to set up market data sources")?;
        let cache = match config.cache.max_age() {
            Some(age) => SeriesCache::with_max_age(age),
            None => SeriesCache::new(),
        };

        Ok(Self {
            adapter,
            cache,
            default_period: config.analysis.default_period,
        })
    }

    /// Fetch history for a ticker, reusing a cached series for the same window.
    pub async fn history(
        &mut self,
        symbol: &str,
        period: Option<LookbackPeriod>,
    ) -> Result<BarSeries> {
        let ticker = Ticker::parse(symbol)?;
        let request = FetchRequest::for_period(ticker, period.unwrap_or(self.default_period));

        let series = self
            .cache
            .get_or_fetch(&self.adapter, &request)
            .await
            .with_context(|| format!("Could not load history for {}", request.ticker))?;
        Ok(series.clone())
    }

    /// Fetch the company profile of a ticker.
    pub async fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile> {
        self.adapter
            .profile(ticker)
            .await
            .with_context(|| format!("Could not load profile for {}", ticker))
    }
}
