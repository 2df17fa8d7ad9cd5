//! Polygon.io daily aggregates.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest};
use stockta_core::types::BarSeries;
use tracing::debug;

use super::{build_client, decode_json, read_body};
use crate::normalize::{normalize, EpochUnit, RawTable};

const NAME: &str = "polygon";

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    results: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a `/v2/aggs` payload (`{"results": [{"t", "o", "h", "l", "c", "v"}]}`).
pub fn parse_polygon(body: &str) -> Result<RawTable, DataError> {
    let response: AggregatesResponse = decode_json(body, NAME)?;

    if response.status.as_deref() == Some("ERROR") {
        return Err(DataError::Transport(format!(
            "{}: {}",
            NAME,
            response.error.unwrap_or_else(|| "upstream error".into())
        )));
    }

    match response.results {
        Some(records) if !records.is_empty() => {
            RawTable::from_records(&records, "t", EpochUnit::Millis)
        }
        _ => Ok(RawTable::default()),
    }
}

/// Daily bars from the Polygon aggregates API, used for non-Vietnamese tickers.
pub struct PolygonSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PolygonSource {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.polygon.io";

    /// Create a Polygon source.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: build_client(HeaderMap::new(), timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl DataSource for PolygonSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DataError::Transport(format!("{}: API key not configured", NAME)))?;

        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            request.ticker.as_str(),
            request.start().format("%Y-%m-%d"),
            request.end.format("%Y-%m-%d"),
        );
        debug!(source = NAME, url = %url, "Requesting daily aggregates");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
                ("apiKey", api_key),
            ])
            .send()
            .await;
        let body = read_body(response, NAME).await?;

        let table = parse_polygon(&body)?;
        normalize(&table, request, NAME)
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockta_core::error::FailureKind;
    use stockta_core::types::Ticker;

    #[test]
    fn test_parse_aggregates() {
        let body = r#"{
            "ticker": "AAPL",
            "status": "OK",
            "resultsCount": 2,
            "results": [
                {"v": 70790813, "vw": 131.6, "o": 130.28, "c": 131.88, "h": 133.41, "l": 129.89,
                 "t": 1704153600000, "n": 1},
                {"v": 62111120, "vw": 130.1, "o": 131.0, "c": 129.5, "h": 132.0, "l": 128.9,
                 "t": 1704240000000, "n": 1}
            ]
        }"#;

        let table = parse_polygon(body).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("c"), Some(&[Some(131.88), Some(129.5)][..]));

        let request = FetchRequest::new(Ticker::parse("AAPL").unwrap(), 30).with_end(
            chrono::DateTime::from_timestamp_millis(1704240000000).unwrap(),
        );
        let series = normalize(&table, &request, NAME).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(0).unwrap().open, 130.28);
        assert_eq!(series.get(1).unwrap().volume, 62111120.0);
    }

    #[test]
    fn test_parse_no_results() {
        let table =
            parse_polygon(r#"{"ticker": "ZZZZ", "status": "OK", "resultsCount": 0}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_error_status() {
        let err = parse_polygon(r#"{"status": "ERROR", "error": "Unknown API Key"}"#).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_polygon("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedSchema);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let source = PolygonSource::new(PolygonSource::DEFAULT_BASE_URL, None, None).unwrap();
        let request = FetchRequest::new(Ticker::parse("AAPL").unwrap(), 30);

        let err = source.fetch(&request).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }
}
