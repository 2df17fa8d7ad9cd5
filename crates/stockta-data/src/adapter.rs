//! Market routing: one fallback chain per market.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest, ProfileSource};
use stockta_core::types::{BarSeries, CompanyProfile, Market, Ticker};
use tracing::{debug, info};

use crate::archive::CsvArchiveSource;
use crate::chain::SourceChain;
use crate::providers::{PolygonSource, VciSource, YahooSource};

/// Polygon provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonSettings {
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
}

impl Default for PolygonSettings {
    fn default() -> Self {
        Self {
            api_key_env: "POLYGON_API_KEY".to_string(),
            base_url: PolygonSource::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// VCI provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VciSettings {
    pub base_url: String,
}

impl Default for VciSettings {
    fn default() -> Self {
        Self {
            base_url: VciSource::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Yahoo provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooSettings {
    pub base_url: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: YahooSource::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Settings for every upstream source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Directory of `{SYMBOL}.csv` files, last resort for `.VN` tickers
    pub archive_dir: Option<PathBuf>,
    /// Per-request timeout; none means the HTTP client default
    pub timeout_secs: Option<u64>,
    pub polygon: PolygonSettings,
    pub vci: VciSettings,
    pub yahoo: YahooSettings,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Routes `.VN` tickers to the Vietnamese chain and everything else to the
/// global chain. Company profiles come from a single optional source.
pub struct MarketDataAdapter {
    vietnam: SourceChain,
    global: SourceChain,
    profiles: Option<Box<dyn ProfileSource>>,
}

impl MarketDataAdapter {
    /// Create an adapter from explicit chains, without a profile source.
    pub fn new(vietnam: SourceChain, global: SourceChain) -> Self {
        Self {
            vietnam,
            global,
            profiles: None,
        }
    }

    /// Attach a company profile source.
    pub fn with_profiles(mut self, source: impl ProfileSource + 'static) -> Self {
        self.profiles = Some(Box::new(source));
        self
    }

    /// Build the standard chains:
    /// VCI, then Yahoo, then the CSV archive (when configured) for Vietnam;
    /// Polygon for everything else. Profiles come from Yahoo for both markets.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, DataError> {
        let timeout = settings.timeout();

        let mut vietnam = SourceChain::new()
            .with_source(VciSource::new(settings.vci.base_url.clone(), timeout)?)
            .with_source(YahooSource::new(settings.yahoo.base_url.clone(), timeout)?);
        if let Some(dir) = &settings.archive_dir {
            vietnam.push(Box::new(CsvArchiveSource::new(dir.clone())));
        }

        let api_key = std::env::var(&settings.polygon.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            debug!(env = %settings.polygon.api_key_env, "Polygon API key not set");
        }
        let global = SourceChain::new().with_source(PolygonSource::new(
            settings.polygon.base_url.clone(),
            api_key,
            timeout,
        )?);

        let profiles = YahooSource::new(settings.yahoo.base_url.clone(), timeout)?;

        info!(
            vietnam = ?vietnam.names(),
            global = ?global.names(),
            profiles = ProfileSource::name(&profiles),
            "Market data adapter ready"
        );
        Ok(Self::new(vietnam, global).with_profiles(profiles))
    }

    /// Chain used for a market.
    pub fn chain_for(&self, market: Market) -> &SourceChain {
        match market {
            Market::Vietnam => &self.vietnam,
            Market::Global => &self.global,
        }
    }

    /// Name of the profile source, if any.
    pub fn profile_source(&self) -> Option<&str> {
        self.profiles.as_ref().map(|p| p.name())
    }

    /// Fetch a company profile. Without a profile source this is an
    /// `EmptyResult`.
    pub async fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile, DataError> {
        let Some(source) = &self.profiles else {
            return Err(DataError::EmptyResult(format!(
                "no profile source configured for {}",
                ticker
            )));
        };
        debug!(ticker = %ticker, source = source.name(), "Fetching company profile");
        source.profile(ticker).await
    }
}

#[async_trait]
impl DataSource for MarketDataAdapter {
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let market = request.ticker.market();
        debug!(
            ticker = %request.ticker,
            market = %market,
            days = request.lookback_days,
            "Routing request"
        );
        self.chain_for(market).fetch(request).await
    }

    fn name(&self) -> &str {
        "adapter"
    }
}
