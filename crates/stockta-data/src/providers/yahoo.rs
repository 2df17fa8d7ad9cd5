//! Yahoo Finance v8 chart API and v10 quote summary.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest, ProfileSource};
use stockta_core::types::{BarSeries, CompanyProfile, Ticker};
use tracing::debug;

use super::{build_client, decode_json, read_body};
use crate::normalize::{normalize, EpochUnit, RawTable};

const NAME: &str = "yahoo";
const PROFILE_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,price";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<Value>>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Map<String, Value>>,
    #[serde(default)]
    adjclose: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryResult {
    asset_profile: Option<AssetProfile>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
    website: Option<String>,
    full_time_employees: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Quantity>,
    dividend_yield: Option<Quantity>,
    beta: Option<Quantity>,
    market_cap: Option<Quantity>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct KeyStatistics {
    price_to_book: Option<Quantity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    market_cap: Option<Quantity>,
}

/// Numeric field wrapped as `{"raw": 1.5, "fmt": "1.50"}`; `{}` when unknown.
#[derive(Debug, Default, Deserialize)]
struct Quantity {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(q: Option<Quantity>) -> Option<f64> {
    q.and_then(|q| q.raw).filter(|v| v.is_finite())
}

fn text(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Decode a `/v10/finance/quoteSummary` payload into a profile.
///
/// Missing modules leave their fields unset. A payload with no result, or
/// one where every field is unset, is an `EmptyResult`.
pub fn parse_yahoo_profile(body: &str, ticker: &Ticker) -> Result<CompanyProfile, DataError> {
    let envelope: SummaryEnvelope = decode_json(body, NAME)?;
    let summary = envelope.quote_summary;

    let Some(result) = summary.result.and_then(|r| r.into_iter().next()) else {
        let reason = summary
            .error
            .and_then(|e| e.get("description").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "no quote summary".into());
        return Err(DataError::EmptyResult(format!("{}: {}", NAME, reason)));
    };

    let asset = result.asset_profile.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let price = result.price.unwrap_or_default();

    let mut profile = CompanyProfile::new(ticker.clone());
    profile.long_name = text(price.long_name).or_else(|| text(price.short_name));
    profile.sector = text(asset.sector);
    profile.industry = text(asset.industry);
    profile.country = text(asset.country);
    profile.website = text(asset.website);
    profile.employees = asset.full_time_employees;
    profile.currency = text(price.currency).or_else(|| text(detail.currency));
    profile.market_cap = raw(price.market_cap).or_else(|| raw(detail.market_cap));
    profile.trailing_pe = raw(detail.trailing_pe);
    profile.price_to_book = raw(stats.price_to_book);
    profile.dividend_yield = raw(detail.dividend_yield);
    profile.beta = raw(detail.beta);

    if profile.is_empty() {
        return Err(DataError::EmptyResult(format!(
            "{}: empty profile for {}",
            NAME, ticker
        )));
    }
    Ok(profile)
}

/// Decode a `/v8/finance/chart` payload.
///
/// Quote columns live under `indicators.quote[0]`; the adjusted close, when
/// present, is carried as an extra `adjclose` column.
pub fn parse_yahoo(body: &str) -> Result<RawTable, DataError> {
    let envelope: ChartEnvelope = decode_json(body, NAME)?;

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => {
            let reason = envelope
                .chart
                .error
                .and_then(|e| e.get("description").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "no chart result".into());
            return Err(DataError::EmptyResult(format!("{}: {}", NAME, reason)));
        }
    };

    let Some(timestamps) = result.timestamp.filter(|t| !t.is_empty()) else {
        return Ok(RawTable::default());
    };

    let indicators = result
        .indicators
        .ok_or_else(|| DataError::MalformedSchema(format!("{}: missing indicators", NAME)))?;
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::MalformedSchema(format!("{}: missing quote block", NAME)))?;

    let mut object = quote;
    object.insert("timestamp".into(), Value::Array(timestamps));
    if let Some(adjclose) = indicators
        .adjclose
        .into_iter()
        .next()
        .and_then(|mut block| block.remove("adjclose"))
    {
        object.insert("adjclose".into(), adjclose);
    }

    RawTable::from_columns(&object, "timestamp", EpochUnit::Seconds)
}

/// Daily bars from the Yahoo chart endpoint and company profiles from the
/// quote summary endpoint; works for both markets.
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    /// Create a Yahoo source.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"),
        );

        Ok(Self {
            client: build_client(headers, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DataSource for YahooSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.ticker.as_str());
        let period1 = request.start().timestamp().to_string();
        let period2 = request.end.timestamp().to_string();
        debug!(source = NAME, url = %url, "Requesting chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await;
        let body = read_body(response, NAME).await?;

        let table = parse_yahoo(&body)?;
        normalize(&table, request, NAME)
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[async_trait]
impl ProfileSource for YahooSource {
    async fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile, DataError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker.as_str());
        debug!(source = NAME, url = %url, "Requesting quote summary");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", PROFILE_MODULES)])
            .send()
            .await;
        let body = read_body(response, NAME).await?;

        parse_yahoo_profile(&body, ticker)
    }

    fn name(&self) -> &str {
        NAME
    }
}
