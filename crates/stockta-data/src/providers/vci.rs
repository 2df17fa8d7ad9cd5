//! Vietcap (VCI) gap-chart API for Vietnamese listings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest};
use stockta_core::types::BarSeries;
use tracing::debug;

use super::{build_client, decode_json, read_body};
use crate::normalize::{normalize, EpochUnit, RawTable};

const NAME: &str = "vci";

/// Decode a gap-chart payload:
/// `[{"symbol", "o": [..], "h": [..], "l": [..], "c": [..], "v": [..], "t": [..]}]`.
///
/// Timestamps are epoch seconds, sometimes sent as strings.
pub fn parse_vci(body: &str) -> Result<RawTable, DataError> {
    let payload: Value = decode_json(body, NAME)?;

    let items = match &payload {
        Value::Array(items) => items,
        Value::Null => return Ok(RawTable::default()),
        other => {
            return Err(DataError::MalformedSchema(format!(
                "{}: expected an array, got {}",
                NAME,
                type_name(other)
            )))
        }
    };

    let Some(first) = items.first() else {
        return Ok(RawTable::default());
    };
    let object = first.as_object().ok_or_else(|| {
        DataError::MalformedSchema(format!("{}: chart entry is not an object", NAME))
    })?;

    RawTable::from_columns(object, "t", EpochUnit::Seconds)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Daily bars from the VCI charting API, queried with the bare symbol (`FPT.VN` -> `FPT`).
pub struct VciSource {
    client: Client,
    base_url: String,
}

impl VciSource {
    /// Default API root (trailing slash included).
    pub const DEFAULT_BASE_URL: &'static str = "https://trading.vietcap.com.vn/api/";

    /// Extra bars requested beyond the calendar window.
    const COUNT_BACK_BUFFER: u32 = 100;

    /// Create a VCI source.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://trading.vietcap.com.vn/"),
        );
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://trading.vietcap.com.vn"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"),
        );

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client: build_client(headers, timeout)?,
            base_url,
        })
    }

    /// End of the request's last day, in epoch seconds.
    fn end_of_day(end: DateTime<Utc>) -> i64 {
        end.date_naive()
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_else(|| end.timestamp())
    }
}

#[async_trait]
impl DataSource for VciSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let url = format!("{}chart/OHLCChart/gap-chart", self.base_url);
        let payload = json!({
            "timeFrame": "ONE_DAY",
            "symbols": [request.ticker.base_symbol()],
            "to": Self::end_of_day(request.end),
            "countBack": request.lookback_days + Self::COUNT_BACK_BUFFER,
        });
        debug!(
            source = NAME,
            url = %url,
            symbol = request.ticker.base_symbol(),
            "Requesting gap chart"
        );

        let response = self.client.post(&url).json(&payload).send().await;
        let body = read_body(response, NAME).await?;

        let table = parse_vci(&body)?;
        normalize(&table, request, NAME)
    }

    fn name(&self) -> &str {
        NAME
    }
}
