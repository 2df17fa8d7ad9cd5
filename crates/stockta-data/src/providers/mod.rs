//! Upstream market-data providers.

mod polygon;
mod vci;
mod yahoo;

pub use polygon::{parse_polygon, PolygonSource};
pub use vci::{parse_vci, VciSource};
pub use yahoo::{parse_yahoo, parse_yahoo_profile, YahooSource};

use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use std::time::Duration;
use stockta_core::error::DataError;

/// Build an HTTP client with default headers and an optional request timeout.
pub(crate) fn build_client(
    headers: HeaderMap,
    timeout: Option<Duration>,
) -> Result<Client, DataError> {
    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| DataError::Transport(format!("failed to build HTTP client: {}", e)))
}

/// Read a response body. Send errors and non-success statuses are transport failures.
pub(crate) async fn read_body(
    response: Result<Response, reqwest::Error>,
    source: &str,
) -> Result<String, DataError> {
    let response = response.map_err(|e| DataError::Transport(format!("{}: {}", source, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(DataError::Transport(format!(
            "{}: upstream returned {}: {}",
            source,
            status,
            text.chars().take(200).collect::<String>()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| DataError::Transport(format!("{}: {}", source, e)))
}

/// Decode a JSON body, classifying failures as schema errors.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    body: &str,
    source: &str,
) -> Result<T, DataError> {
    serde_json::from_str(body).map_err(|e| {
        DataError::MalformedSchema(format!("{}: invalid JSON payload: {}", source, e))
    })
}
